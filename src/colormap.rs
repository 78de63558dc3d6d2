//! Named colormap lookup.
//!
//! A colormap is referenced by one of a fixed set of names and resolved to an
//! engine-opaque [`colorous::Gradient`]. Names the gradient library cannot
//! realize resolve to `None`; callers surface that as
//! [`UniplotError::NotImplemented`](crate::error::UniplotError::NotImplemented)
//! for that call only.

use crate::error::{UniResult, UniplotError};
use colorous::Gradient;
use strum::{Display, EnumIter, EnumString};

/// The registered colormap names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Colormap {
    /// cyclic hue sweep
    Hsv,
    /// black-red-yellow-white
    Hot,
    /// linear grayscale
    Gray,
    /// grayscale with a blue tinge
    Bone,
    /// linear copper tones
    Copper,
    /// pastel pink shades
    Pink,
    /// all white
    White,
    /// alternating primary colors
    Flag,
    /// line-plot color cycle
    Lines,
    /// regularly sampled color cube
    Colorcube,
    /// blue-cyan-yellow-red
    #[default]
    Jet,
    /// cyan-magenta
    Cool,
    /// red-orange-yellow
    Autumn,
    /// magenta-yellow
    Spring,
    /// blue-green
    Winter,
    /// green-yellow
    Summer,
}

impl Colormap {
    /// Resolve a user-supplied name.
    ///
    /// # Errors
    /// Returns [`UniplotError::UnknownOption`] if the name is not one of the
    /// registered colormap names.
    pub fn lookup(name: &str) -> UniResult<Self> {
        name.parse()
            .map_err(|_| UniplotError::UnknownOption(format!("colormap {name} is not registered")))
    }

    /// Return the gradient backing this colormap, or `None` when the gradient
    /// library has no usable counterpart.
    #[must_use]
    pub const fn gradient(self) -> Option<Gradient> {
        match self {
            Self::Hsv => Some(colorous::SINEBOW),
            Self::Hot => Some(colorous::INFERNO),
            Self::Gray | Self::Bone => Some(colorous::GREYS),
            Self::Copper | Self::Autumn => Some(colorous::ORANGES),
            Self::Pink => Some(colorous::PURPLES),
            Self::Jet => Some(colorous::TURBO),
            Self::Cool => Some(colorous::COOL),
            Self::Spring => Some(colorous::PLASMA),
            Self::Winter => Some(colorous::BLUES),
            Self::Summer => Some(colorous::GREENS),
            Self::White | Self::Flag | Self::Lines | Self::Colorcube => None,
        }
    }

    /// Return the gradient or fail with `NotImplemented`.
    ///
    /// # Errors
    /// Returns [`UniplotError::NotImplemented`] when this name has no
    /// realizable gradient.
    pub fn try_gradient(self) -> UniResult<Gradient> {
        self.gradient().ok_or_else(|| {
            UniplotError::NotImplemented(format!("colormap {self} has no realizable gradient"))
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_matches::assert_matches;
    use strum::IntoEnumIterator;
    #[test]
    fn lookup_known_names() {
        assert_eq!(Colormap::lookup("jet").unwrap(), Colormap::Jet);
        assert_eq!(Colormap::lookup("hsv").unwrap(), Colormap::Hsv);
        assert_eq!(Colormap::lookup("colorcube").unwrap(), Colormap::Colorcube);
    }
    #[test]
    fn lookup_unknown_name() {
        assert_matches!(
            Colormap::lookup("viridis"),
            Err(UniplotError::UnknownOption(_))
        );
    }
    #[test]
    fn sixteen_names_are_registered() {
        assert_eq!(Colormap::iter().count(), 16);
    }
    #[test]
    fn unrealizable_names_fail_per_call() {
        assert_matches!(
            Colormap::Flag.try_gradient(),
            Err(UniplotError::NotImplemented(_))
        );
        assert!(Colormap::Jet.try_gradient().is_ok());
    }
    #[test]
    fn display_matches_lookup() {
        for map in Colormap::iter() {
            assert_eq!(Colormap::lookup(&map.to_string()).unwrap(), map);
        }
    }
}
