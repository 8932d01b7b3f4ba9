// Copyright 2025 the Chartsmith Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout errors.
//!
//! Errors here are contract violations in the chart description (a plot band naming a category
//! the axis does not have, a series kind handed to a domain rule that cannot place it, a cyclic
//! Sankey graph). Layout impossibility, such as a container too small for its guides, is never an
//! error: the bounds solver clamps to zero and logs a warning.

use alloc::string::String;
use core::fmt;

use chartsmith_sankey::SankeyError;

use crate::series::SeriesKind;

/// Which Cartesian axis an operation concerns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AxisRole {
    /// The shared horizontal axis.
    X,
    /// A vertical axis.
    Y,
}

impl fmt::Display for AxisRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::X => "x",
            Self::Y => "y",
        })
    }
}

/// Errors produced by the layout pipeline.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum LayoutError {
    /// A plot band or plot line references a category the axis does not contain.
    #[error("category `{category}` is not on the {role} axis")]
    UnknownCategory {
        /// The axis holding the band or line.
        role: AxisRole,
        /// The unresolved category value.
        category: String,
    },
    /// A series kind has no domain rule for the requested axis.
    #[error("series kind `{kind}` has no {role} axis domain rule")]
    NoDomainRule {
        /// The offending series kind.
        kind: SeriesKind,
        /// The axis being aggregated.
        role: AxisRole,
    },
    /// A series targets a Y axis index that does not exist.
    #[error("series `{series}` targets y axis {index}, which does not exist")]
    MissingYAxis {
        /// Series name.
        series: String,
        /// The requested axis index.
        index: usize,
    },
    /// A point on a category axis names a category that is not in the list.
    #[error("point {point} of series `{series}` has no category on the {role} axis")]
    MissingCategory {
        /// Series name.
        series: String,
        /// Index of the point in its series.
        point: usize,
        /// The axis being resolved.
        role: AxisRole,
    },
    /// Sankey layout failed.
    #[error(transparent)]
    Sankey(#[from] SankeyError),
}
