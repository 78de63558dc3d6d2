#![warn(missing_docs)]
//! Colorbar state of an axis.

use strum::{Display, EnumString};

/// Placement of the colorbar relative to the axis area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
pub enum ColorbarLocation {
    /// above, inside the axis area
    North,
    /// below, inside
    South,
    /// right, inside
    East,
    /// left, inside
    West,
    /// above, outside
    NorthOutside,
    /// below, outside
    SouthOutside,
    /// right, outside
    #[default]
    EastOutside,
    /// left, outside
    WestOutside,
}

/// Colorbar state: visibility, placement and title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Colorbar {
    /// draw the colorbar
    pub visible: bool,
    /// placement
    pub location: ColorbarLocation,
    /// title printed next to the bar
    pub title: String,
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn locations_parse_by_name() {
        assert_eq!(
            "NorthOutside".parse::<ColorbarLocation>().unwrap(),
            ColorbarLocation::NorthOutside
        );
        assert!("Center".parse::<ColorbarLocation>().is_err());
    }
    #[test]
    fn default_is_hidden_east_outside() {
        let colorbar = Colorbar::default();
        assert!(!colorbar.visible);
        assert_eq!(colorbar.location, ColorbarLocation::EastOutside);
    }
}
