// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/symbols.rs - ODB++ standard symbol names.
 *  Copyright (C) 2026  Forest Crossman <cyrozap@gmail.com>
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use once_cell::sync::Lazy;
use regex::Captures;
use rust_decimal::Decimal;

use crate::decoder::{DecodeOption, decode_line};
use crate::error::Result;
use crate::structures::{HolePlating, NUMBER, parse_decimal, parse_int, unknown};

/// Geometry of a standard symbol, in the symbol's own units (usually mils
/// or micrometers, depending on the job).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardSymbol {
    Round {
        diameter: Decimal,
    },
    Square {
        side: Decimal,
    },
    Rectangle {
        width: Decimal,
        height: Decimal,
    },
    Oval {
        width: Decimal,
        height: Decimal,
    },
    Diamond {
        width: Decimal,
        height: Decimal,
    },
    Octagon {
        width: Decimal,
        height: Decimal,
        corner_size: Decimal,
    },
    RoundDonut {
        outer_diameter: Decimal,
        inner_diameter: Decimal,
    },
    SquareDonut {
        outer_diameter: Decimal,
        inner_diameter: Decimal,
    },
    SquareRoundDonut {
        outer_diameter: Decimal,
        inner_diameter: Decimal,
    },
    RoundedSquareDonut {
        outer_diameter: Decimal,
        inner_diameter: Decimal,
        corner_radius: Decimal,
        corners: Corners,
    },
    RectangleDonut {
        outer_width: Decimal,
        outer_height: Decimal,
        line_width: Decimal,
    },
    RoundedRectangleDonut {
        outer_width: Decimal,
        outer_height: Decimal,
        line_width: Decimal,
        corner_radius: Decimal,
        corners: Corners,
    },
    OvalDonut {
        outer_width: Decimal,
        outer_height: Decimal,
        line_width: Decimal,
    },
    HorizontalHexagon {
        width: Decimal,
        height: Decimal,
        corner_size: Decimal,
    },
    VerticalHexagon {
        width: Decimal,
        height: Decimal,
        corner_size: Decimal,
    },
    Butterfly {
        diameter: Decimal,
    },
    SquareButterfly {
        size: Decimal,
    },
    Triangle {
        base: Decimal,
        height: Decimal,
    },
    HalfOval {
        width: Decimal,
        height: Decimal,
    },
    Ellipse {
        width: Decimal,
        height: Decimal,
    },
    /// `thr` (rounded spokes) and `ths` (squared spokes).
    RoundThermal {
        outer_diameter: Decimal,
        inner_diameter: Decimal,
        angle: Decimal,
        num_spokes: u32,
        gap: Decimal,
        rounded: bool,
    },
    /// `s_ths` and `s_tho` (open corners).
    SquareThermal {
        outer_size: Decimal,
        inner_size: Decimal,
        angle: Decimal,
        num_spokes: u32,
        gap: Decimal,
        open_corners: bool,
    },
    SquareRoundThermal {
        outer_size: Decimal,
        inner_diameter: Decimal,
        angle: Decimal,
        num_spokes: u32,
        gap: Decimal,
    },
    /// `rc_ths` and `rc_tho` (open corners).
    RectangularThermal {
        outer_width: Decimal,
        outer_height: Decimal,
        angle: Decimal,
        num_spokes: u32,
        gap: Decimal,
        air_gap: Decimal,
        open_corners: bool,
    },
    RoundedSquareThermal {
        outer_size: Decimal,
        inner_size: Decimal,
        angle: Decimal,
        num_spokes: u32,
        gap: Decimal,
        corner_radius: Decimal,
        corners: Corners,
        open_corners: bool,
    },
    RoundedRectangleThermal {
        outer_width: Decimal,
        outer_height: Decimal,
        angle: Decimal,
        num_spokes: u32,
        gap: Decimal,
        corner_radius: Decimal,
        corners: Corners,
        open_corners: bool,
    },
    OvalThermal {
        outer_width: Decimal,
        outer_height: Decimal,
        angle: Decimal,
        num_spokes: u32,
        gap: Decimal,
        line_width: Decimal,
        open_corners: bool,
    },
    Moire {
        ring_width: Decimal,
        ring_gap: Decimal,
        num_rings: u32,
        line_width: Decimal,
        line_length: Decimal,
        line_angle: Decimal,
    },
    Hole {
        diameter: Decimal,
        plating: HolePlating,
        tolerance_plus: Decimal,
        tolerance_minus: Decimal,
    },
}

/// The rounded corners of a rounded symbol, numbered 1 (upper right) to 4
/// (lower right) counter-clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Corners(u8);

impl Corners {
    pub const ALL: Corners = Corners(0b1111);

    /// Parses a corner list such as `13`. Only digits 1 to 4 are accepted.
    pub fn parse(s: &str) -> Option<Self> {
        s.chars()
            .try_fold(0u8, |bits, c| match c {
                '1'..='4' => Some(bits | 1 << (c as u8 - b'1')),
                _ => None,
            })
            .filter(|bits| *bits != 0)
            .map(Corners)
    }

    pub fn contains(self, corner: u8) -> bool {
        (1..=4).contains(&corner) && self.0 & (1 << (corner - 1)) != 0
    }
}

impl Default for Corners {
    fn default() -> Self {
        Corners::ALL
    }
}

fn n(caps: &Captures<'_>, i: usize) -> Result<Decimal> {
    parse_decimal(&caps[i])
}

/// Optional corner list; every corner is rounded when it is omitted.
fn corners(caps: &Captures<'_>, i: usize) -> Result<Corners> {
    match caps.get(i) {
        Some(m) => Corners::parse(m.as_str()).ok_or_else(|| unknown("corner list", m.as_str())),
        None => Ok(Corners::ALL),
    }
}

fn open_corners(caps: &Captures<'_>, i: usize) -> bool {
    &caps[i] == "o"
}

fn round(caps: &Captures<'_>) -> Result<StandardSymbol> {
    Ok(StandardSymbol::Round { diameter: n(caps, 1)? })
}

fn square(caps: &Captures<'_>) -> Result<StandardSymbol> {
    Ok(StandardSymbol::Square { side: n(caps, 1)? })
}

fn rectangle(caps: &Captures<'_>) -> Result<StandardSymbol> {
    Ok(StandardSymbol::Rectangle {
        width: n(caps, 1)?,
        height: n(caps, 2)?,
    })
}

fn oval(caps: &Captures<'_>) -> Result<StandardSymbol> {
    Ok(StandardSymbol::Oval {
        width: n(caps, 1)?,
        height: n(caps, 2)?,
    })
}

fn diamond(caps: &Captures<'_>) -> Result<StandardSymbol> {
    Ok(StandardSymbol::Diamond {
        width: n(caps, 1)?,
        height: n(caps, 2)?,
    })
}

fn octagon(caps: &Captures<'_>) -> Result<StandardSymbol> {
    Ok(StandardSymbol::Octagon {
        width: n(caps, 1)?,
        height: n(caps, 2)?,
        corner_size: n(caps, 3)?,
    })
}

fn round_donut(caps: &Captures<'_>) -> Result<StandardSymbol> {
    Ok(StandardSymbol::RoundDonut {
        outer_diameter: n(caps, 1)?,
        inner_diameter: n(caps, 2)?,
    })
}

fn square_donut(caps: &Captures<'_>) -> Result<StandardSymbol> {
    Ok(StandardSymbol::SquareDonut {
        outer_diameter: n(caps, 1)?,
        inner_diameter: n(caps, 2)?,
    })
}

fn square_round_donut(caps: &Captures<'_>) -> Result<StandardSymbol> {
    Ok(StandardSymbol::SquareRoundDonut {
        outer_diameter: n(caps, 1)?,
        inner_diameter: n(caps, 2)?,
    })
}

fn rounded_square_donut(caps: &Captures<'_>) -> Result<StandardSymbol> {
    Ok(StandardSymbol::RoundedSquareDonut {
        outer_diameter: n(caps, 1)?,
        inner_diameter: n(caps, 2)?,
        corner_radius: n(caps, 3)?,
        corners: corners(caps, 4)?,
    })
}

fn rectangle_donut(caps: &Captures<'_>) -> Result<StandardSymbol> {
    Ok(StandardSymbol::RectangleDonut {
        outer_width: n(caps, 1)?,
        outer_height: n(caps, 2)?,
        line_width: n(caps, 3)?,
    })
}

fn rounded_rectangle_donut(caps: &Captures<'_>) -> Result<StandardSymbol> {
    Ok(StandardSymbol::RoundedRectangleDonut {
        outer_width: n(caps, 1)?,
        outer_height: n(caps, 2)?,
        line_width: n(caps, 3)?,
        corner_radius: n(caps, 4)?,
        corners: corners(caps, 5)?,
    })
}

fn oval_donut(caps: &Captures<'_>) -> Result<StandardSymbol> {
    Ok(StandardSymbol::OvalDonut {
        outer_width: n(caps, 1)?,
        outer_height: n(caps, 2)?,
        line_width: n(caps, 3)?,
    })
}

fn horizontal_hexagon(caps: &Captures<'_>) -> Result<StandardSymbol> {
    Ok(StandardSymbol::HorizontalHexagon {
        width: n(caps, 1)?,
        height: n(caps, 2)?,
        corner_size: n(caps, 3)?,
    })
}

fn vertical_hexagon(caps: &Captures<'_>) -> Result<StandardSymbol> {
    Ok(StandardSymbol::VerticalHexagon {
        width: n(caps, 1)?,
        height: n(caps, 2)?,
        corner_size: n(caps, 3)?,
    })
}

fn butterfly(caps: &Captures<'_>) -> Result<StandardSymbol> {
    Ok(StandardSymbol::Butterfly { diameter: n(caps, 1)? })
}

fn square_butterfly(caps: &Captures<'_>) -> Result<StandardSymbol> {
    Ok(StandardSymbol::SquareButterfly { size: n(caps, 1)? })
}

fn triangle(caps: &Captures<'_>) -> Result<StandardSymbol> {
    Ok(StandardSymbol::Triangle {
        base: n(caps, 1)?,
        height: n(caps, 2)?,
    })
}

fn half_oval(caps: &Captures<'_>) -> Result<StandardSymbol> {
    Ok(StandardSymbol::HalfOval {
        width: n(caps, 1)?,
        height: n(caps, 2)?,
    })
}

fn ellipse(caps: &Captures<'_>) -> Result<StandardSymbol> {
    Ok(StandardSymbol::Ellipse {
        width: n(caps, 1)?,
        height: n(caps, 2)?,
    })
}

fn round_thermal(caps: &Captures<'_>) -> Result<StandardSymbol> {
    Ok(StandardSymbol::RoundThermal {
        rounded: &caps[1] == "r",
        outer_diameter: n(caps, 2)?,
        inner_diameter: n(caps, 3)?,
        angle: n(caps, 4)?,
        num_spokes: parse_int(&caps[5])?,
        gap: n(caps, 6)?,
    })
}

fn square_thermal(caps: &Captures<'_>) -> Result<StandardSymbol> {
    Ok(StandardSymbol::SquareThermal {
        open_corners: open_corners(caps, 1),
        outer_size: n(caps, 2)?,
        inner_size: n(caps, 3)?,
        angle: n(caps, 4)?,
        num_spokes: parse_int(&caps[5])?,
        gap: n(caps, 6)?,
    })
}

fn square_round_thermal(caps: &Captures<'_>) -> Result<StandardSymbol> {
    Ok(StandardSymbol::SquareRoundThermal {
        outer_size: n(caps, 1)?,
        inner_diameter: n(caps, 2)?,
        angle: n(caps, 3)?,
        num_spokes: parse_int(&caps[4])?,
        gap: n(caps, 5)?,
    })
}

fn rectangular_thermal(caps: &Captures<'_>) -> Result<StandardSymbol> {
    Ok(StandardSymbol::RectangularThermal {
        open_corners: open_corners(caps, 1),
        outer_width: n(caps, 2)?,
        outer_height: n(caps, 3)?,
        angle: n(caps, 4)?,
        num_spokes: parse_int(&caps[5])?,
        gap: n(caps, 6)?,
        air_gap: n(caps, 7)?,
    })
}

fn rounded_square_thermal(caps: &Captures<'_>) -> Result<StandardSymbol> {
    Ok(StandardSymbol::RoundedSquareThermal {
        open_corners: open_corners(caps, 1),
        outer_size: n(caps, 2)?,
        inner_size: n(caps, 3)?,
        angle: n(caps, 4)?,
        num_spokes: parse_int(&caps[5])?,
        gap: n(caps, 6)?,
        corner_radius: n(caps, 7)?,
        corners: corners(caps, 8)?,
    })
}

fn rounded_rectangle_thermal(caps: &Captures<'_>) -> Result<StandardSymbol> {
    Ok(StandardSymbol::RoundedRectangleThermal {
        open_corners: open_corners(caps, 1),
        outer_width: n(caps, 2)?,
        outer_height: n(caps, 3)?,
        angle: n(caps, 4)?,
        num_spokes: parse_int(&caps[5])?,
        gap: n(caps, 6)?,
        corner_radius: n(caps, 7)?,
        corners: corners(caps, 8)?,
    })
}

fn oval_thermal(caps: &Captures<'_>) -> Result<StandardSymbol> {
    Ok(StandardSymbol::OvalThermal {
        open_corners: open_corners(caps, 1),
        outer_width: n(caps, 2)?,
        outer_height: n(caps, 3)?,
        angle: n(caps, 4)?,
        num_spokes: parse_int(&caps[5])?,
        gap: n(caps, 6)?,
        line_width: n(caps, 7)?,
    })
}

fn moire(caps: &Captures<'_>) -> Result<StandardSymbol> {
    Ok(StandardSymbol::Moire {
        ring_width: n(caps, 1)?,
        ring_gap: n(caps, 2)?,
        num_rings: parse_int(&caps[3])?,
        line_width: n(caps, 4)?,
        line_length: n(caps, 5)?,
        line_angle: n(caps, 6)?,
    })
}

fn hole(caps: &Captures<'_>) -> Result<StandardSymbol> {
    Ok(StandardSymbol::Hole {
        diameter: n(caps, 1)?,
        plating: caps[2].parse()?,
        tolerance_plus: n(caps, 3)?,
        tolerance_minus: n(caps, 4)?,
    })
}

static SYMBOL_OPTIONS: Lazy<Vec<DecodeOption<StandardSymbol>>> = Lazy::new(|| {
    let num = NUMBER;
    vec![
        DecodeOption::new(&format!(r"^r{num}$"), round),
        DecodeOption::new(&format!(r"^s{num}$"), square),
        DecodeOption::new(&format!(r"^rect{num}x{num}$"), rectangle),
        DecodeOption::new(&format!(r"^oval{num}x{num}$"), oval),
        DecodeOption::new(&format!(r"^di{num}x{num}$"), diamond),
        DecodeOption::new(&format!(r"^oct{num}x{num}x{num}$"), octagon),
        DecodeOption::new(&format!(r"^donut_r{num}x{num}$"), round_donut),
        DecodeOption::new(&format!(r"^donut_s{num}x{num}$"), square_donut),
        DecodeOption::new(&format!(r"^donut_sr{num}x{num}$"), square_round_donut),
        DecodeOption::new(
            &format!(r"^donut_s{num}x{num}xr{num}(?:x([1-4]+))?$"),
            rounded_square_donut,
        ),
        DecodeOption::new(&format!(r"^donut_rc{num}x{num}x{num}$"), rectangle_donut),
        DecodeOption::new(
            &format!(r"^donut_rc{num}x{num}x{num}xr{num}(?:x([1-4]+))?$"),
            rounded_rectangle_donut,
        ),
        DecodeOption::new(&format!(r"^donut_o{num}x{num}x{num}$"), oval_donut),
        DecodeOption::new(&format!(r"^hex_l{num}x{num}x{num}$"), horizontal_hexagon),
        DecodeOption::new(&format!(r"^hex_s{num}x{num}x{num}$"), vertical_hexagon),
        DecodeOption::new(&format!(r"^bfr{num}$"), butterfly),
        DecodeOption::new(&format!(r"^bfs{num}$"), square_butterfly),
        DecodeOption::new(&format!(r"^tri{num}x{num}$"), triangle),
        DecodeOption::new(&format!(r"^oval_h{num}x{num}$"), half_oval),
        DecodeOption::new(&format!(r"^el{num}x{num}$"), ellipse),
        DecodeOption::new(
            &format!(r"^th([rs]){num}x{num}x{num}x(\d+)x{num}$"),
            round_thermal,
        ),
        DecodeOption::new(
            &format!(r"^s_th([so]){num}x{num}x{num}x(\d+)x{num}$"),
            square_thermal,
        ),
        DecodeOption::new(
            &format!(r"^sr_ths{num}x{num}x{num}x(\d+)x{num}$"),
            square_round_thermal,
        ),
        DecodeOption::new(
            &format!(r"^rc_th([so]){num}x{num}x{num}x(\d+)x{num}x{num}$"),
            rectangular_thermal,
        ),
        DecodeOption::new(
            &format!(r"^s_th([so]){num}x{num}x{num}x(\d+)x{num}xr{num}(?:x([1-4]+))?$"),
            rounded_square_thermal,
        ),
        DecodeOption::new(
            &format!(r"^rc_th([so]){num}x{num}x{num}x(\d+)x{num}xr{num}(?:x([1-4]+))?$"),
            rounded_rectangle_thermal,
        ),
        DecodeOption::new(
            &format!(r"^o_th([so]){num}x{num}x{num}x(\d+)x{num}x{num}$"),
            oval_thermal,
        ),
        DecodeOption::new(
            &format!(r"^moire{num}x{num}x(\d+)x{num}x{num}x{num}$"),
            moire,
        ),
        DecodeOption::new(
            &format!(r"^hole{num}x([pnvPNV])x{num}x{num}$"),
            hole,
        ),
    ]
    .into_iter()
    .collect::<Result<_>>()
    .expect("valid standard symbol patterns")
});

/// Decoder options for standard symbol names.
pub fn symbol_decoder_options() -> &'static [DecodeOption<StandardSymbol>] {
    &SYMBOL_OPTIONS
}

impl StandardSymbol {
    /// Parses a symbol name. User-defined symbols are not standard and give
    /// `None`.
    pub fn parse(name: &str) -> Result<Option<Self>> {
        decode_line(name, symbol_decoder_options())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    fn d(s: &str) -> Decimal {
        parse_decimal(s).unwrap()
    }

    #[test]
    fn round_symbol() {
        assert_eq!(
            StandardSymbol::parse("r3.5").unwrap(),
            Some(StandardSymbol::Round { diameter: d("3.5") })
        );
        assert_eq!(StandardSymbol::parse("rabc").unwrap(), None);
    }

    #[rstest]
    #[case("s10", StandardSymbol::Square { side: d("10") })]
    #[case("rect20x5.5", StandardSymbol::Rectangle { width: d("20"), height: d("5.5") })]
    #[case("oval30x10", StandardSymbol::Oval { width: d("30"), height: d("10") })]
    #[case("oval_h30x10", StandardSymbol::HalfOval { width: d("30"), height: d("10") })]
    #[case("donut_r40x20", StandardSymbol::RoundDonut { outer_diameter: d("40"), inner_diameter: d("20") })]
    #[case("oct10x10x2", StandardSymbol::Octagon { width: d("10"), height: d("10"), corner_size: d("2") })]
    #[case("bfs12", StandardSymbol::SquareButterfly { size: d("12") })]
    #[case(
        "hole32xpx2x1",
        StandardSymbol::Hole {
            diameter: d("32"),
            plating: HolePlating::Plated,
            tolerance_plus: d("2"),
            tolerance_minus: d("1"),
        }
    )]
    #[case(
        "ths60x40x45x4x10",
        StandardSymbol::RoundThermal {
            outer_diameter: d("60"),
            inner_diameter: d("40"),
            angle: d("45"),
            num_spokes: 4,
            gap: d("10"),
            rounded: false,
        }
    )]
    #[case("donut_sr40x20", StandardSymbol::SquareRoundDonut { outer_diameter: d("40"), inner_diameter: d("20") })]
    #[case("donut_rc60x40x5", StandardSymbol::RectangleDonut { outer_width: d("60"), outer_height: d("40"), line_width: d("5") })]
    #[case("donut_o60x40x5", StandardSymbol::OvalDonut { outer_width: d("60"), outer_height: d("40"), line_width: d("5") })]
    #[case(
        "donut_s40x20xr3x13",
        StandardSymbol::RoundedSquareDonut {
            outer_diameter: d("40"),
            inner_diameter: d("20"),
            corner_radius: d("3"),
            corners: Corners::parse("13").unwrap(),
        }
    )]
    #[case(
        "s_tho60x40x45x4x10",
        StandardSymbol::SquareThermal {
            outer_size: d("60"),
            inner_size: d("40"),
            angle: d("45"),
            num_spokes: 4,
            gap: d("10"),
            open_corners: true,
        }
    )]
    #[case(
        "sr_ths60x40x0x4x8",
        StandardSymbol::SquareRoundThermal {
            outer_size: d("60"),
            inner_diameter: d("40"),
            angle: d("0"),
            num_spokes: 4,
            gap: d("8"),
        }
    )]
    #[case(
        "rc_ths80x60x0x2x10x5",
        StandardSymbol::RectangularThermal {
            outer_width: d("80"),
            outer_height: d("60"),
            angle: d("0"),
            num_spokes: 2,
            gap: d("10"),
            air_gap: d("5"),
            open_corners: false,
        }
    )]
    #[case(
        "rc_ths80x60x0x2x10xr4",
        StandardSymbol::RoundedRectangleThermal {
            outer_width: d("80"),
            outer_height: d("60"),
            angle: d("0"),
            num_spokes: 2,
            gap: d("10"),
            corner_radius: d("4"),
            corners: Corners::ALL,
            open_corners: false,
        }
    )]
    #[case(
        "o_ths80x40x0x2x10x5",
        StandardSymbol::OvalThermal {
            outer_width: d("80"),
            outer_height: d("40"),
            angle: d("0"),
            num_spokes: 2,
            gap: d("10"),
            line_width: d("5"),
            open_corners: false,
        }
    )]
    fn standard_names(#[case] name: &str, #[case] expected: StandardSymbol) {
        assert_eq!(StandardSymbol::parse(name).unwrap(), Some(expected));
    }

    #[test]
    fn corner_lists() {
        let corners = Corners::parse("24").unwrap();
        assert!(corners.contains(2) && corners.contains(4));
        assert!(!corners.contains(1) && !corners.contains(3));
        assert_eq!(Corners::parse("1234"), Some(Corners::ALL));
        assert_eq!(Corners::parse("5"), None);
        assert_eq!(Corners::parse(""), None);
    }

    #[rstest]
    #[case("my_pad")]
    #[case("donut_s40x20xr3x5")]
    #[case("rect20")]
    #[case("r10x10")]
    #[case("")]
    fn user_defined_names(#[case] name: &str) {
        assert_eq!(StandardSymbol::parse(name).unwrap(), None);
    }
}
