use palette::Srgb;
use palette::named;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PointColor – row color tags assigned by the classifier
// ---------------------------------------------------------------------------

/// Color tag of one (gene, sample) row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointColor {
    Red,
    Blue,
    Green,
    Black,
    Gray,
}

impl PointColor {
    /// Order in which traces are first laid out, before draw sorting.
    pub const TRACE_ORDER: [PointColor; 5] = [
        PointColor::Blue,
        PointColor::Red,
        PointColor::Green,
        PointColor::Black,
        PointColor::Gray,
    ];

    /// CSS color keyword.
    pub fn name(self) -> &'static str {
        match self {
            PointColor::Red => "red",
            PointColor::Blue => "blue",
            PointColor::Green => "green",
            PointColor::Black => "black",
            PointColor::Gray => "gray",
        }
    }

    pub fn srgb(self) -> Srgb<u8> {
        match self {
            PointColor::Red => named::RED,
            PointColor::Blue => named::BLUE,
            PointColor::Green => named::GREEN,
            PointColor::Black => named::BLACK,
            PointColor::Gray => named::GRAY,
        }
    }

    /// `#rrggbb` form of [`PointColor::srgb`].
    pub fn hex(self) -> String {
        let c = self.srgb();
        format!("#{:02x}{:02x}{:02x}", c.red, c.green, c.blue)
    }

    /// Legend text shown for the trace of this color.
    pub fn legend_label(self) -> &'static str {
        match self {
            PointColor::Red => "Mfd<sup>−</sup>",
            PointColor::Blue => "YB955",
            PointColor::Green => "Common Genes",
            PointColor::Black => "Partial Threshold",
            PointColor::Gray => "Below Threshold",
        }
    }

    /// Higher values are drawn later, i.e. on top.
    pub fn render_priority(self) -> u8 {
        match self {
            PointColor::Red | PointColor::Blue => 5,
            PointColor::Green => 4,
            PointColor::Black => 3,
            PointColor::Gray => 2,
        }
    }
}

/// Legend position keyed by legend label; unknown labels sort last.
pub fn legend_rank(label: &str) -> u32 {
    match label {
        "YB955" => 0,
        "Mfd<sup>−</sup>" => 1,
        "Common Genes" => 2,
        "Partial Threshold" => 3,
        "Below Threshold" => 4,
        _ => 100,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_matches_css_keywords() {
        assert_eq!(PointColor::Red.hex(), "#ff0000");
        assert_eq!(PointColor::Green.hex(), "#008000");
        assert_eq!(PointColor::Gray.hex(), "#808080");
    }

    #[test]
    fn legend_rank_follows_label() {
        assert_eq!(legend_rank(PointColor::Blue.legend_label()), 0);
        assert_eq!(legend_rank(PointColor::Red.legend_label()), 1);
        assert_eq!(legend_rank("something else"), 100);
    }
}
