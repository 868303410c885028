// Copyright 2025 the Display List Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use bytemuck::{CheckedBitPattern, NoUninit};
use peniko::{Compose, Mix};

/// Blend modes understood by the display list.
///
/// The discriminants are part of the binary format.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, NoUninit, CheckedBitPattern)]
#[repr(u32)]
pub enum BlendMode {
    Clear = 0,
    Src = 1,
    Dst = 2,
    #[default]
    SrcOver = 3,
    DstOver = 4,
    SrcIn = 5,
    DstIn = 6,
    SrcOut = 7,
    DstOut = 8,
    SrcATop = 9,
    DstATop = 10,
    Xor = 11,
    Plus = 12,
    Modulate = 13,
    Screen = 14,
    Overlay = 15,
    Darken = 16,
    Lighten = 17,
    ColorDodge = 18,
    ColorBurn = 19,
    HardLight = 20,
    SoftLight = 21,
    Difference = 22,
    Exclusion = 23,
    Multiply = 24,
    Hue = 25,
    Saturation = 26,
    Color = 27,
    Luminosity = 28,
}

impl BlendMode {
    /// Whether drawing with this mode at alpha `a` is equivalent to drawing at
    /// full alpha and then scaling the result by `a`, for non-overlapping
    /// geometry.
    pub const fn is_opacity_compatible(self) -> bool {
        match self {
            Self::SrcOver => true,
            Self::Clear
            | Self::Src
            | Self::Dst
            | Self::DstOver
            | Self::SrcIn
            | Self::DstIn
            | Self::SrcOut
            | Self::DstOut
            | Self::SrcATop
            | Self::DstATop
            | Self::Xor
            | Self::Plus
            | Self::Modulate
            | Self::Screen
            | Self::Overlay
            | Self::Darken
            | Self::Lighten
            | Self::ColorDodge
            | Self::ColorBurn
            | Self::HardLight
            | Self::SoftLight
            | Self::Difference
            | Self::Exclusion
            | Self::Multiply
            | Self::Hue
            | Self::Saturation
            | Self::Color
            | Self::Luminosity => false,
        }
    }

    /// Whether this mode changes destination pixels where the source is
    /// transparent black, i.e. outside the geometry being drawn.
    pub const fn affects_outside_source(self) -> bool {
        match self {
            Self::Clear
            | Self::Src
            | Self::SrcIn
            | Self::DstIn
            | Self::SrcOut
            | Self::DstATop
            | Self::Modulate => true,
            Self::Dst
            | Self::SrcOver
            | Self::DstOver
            | Self::DstOut
            | Self::SrcATop
            | Self::Xor
            | Self::Plus
            | Self::Screen
            | Self::Overlay
            | Self::Darken
            | Self::Lighten
            | Self::ColorDodge
            | Self::ColorBurn
            | Self::HardLight
            | Self::SoftLight
            | Self::Difference
            | Self::Exclusion
            | Self::Multiply
            | Self::Hue
            | Self::Saturation
            | Self::Color
            | Self::Luminosity => false,
        }
    }

    /// Short lower camel case name, as used in printed display lists.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::Src => "src",
            Self::Dst => "dst",
            Self::SrcOver => "srcOver",
            Self::DstOver => "dstOver",
            Self::SrcIn => "srcIn",
            Self::DstIn => "dstIn",
            Self::SrcOut => "srcOut",
            Self::DstOut => "dstOut",
            Self::SrcATop => "srcATop",
            Self::DstATop => "dstATop",
            Self::Xor => "xor",
            Self::Plus => "plus",
            Self::Modulate => "modulate",
            Self::Screen => "screen",
            Self::Overlay => "overlay",
            Self::Darken => "darken",
            Self::Lighten => "lighten",
            Self::ColorDodge => "colorDodge",
            Self::ColorBurn => "colorBurn",
            Self::HardLight => "hardLight",
            Self::SoftLight => "softLight",
            Self::Difference => "difference",
            Self::Exclusion => "exclusion",
            Self::Multiply => "multiply",
            Self::Hue => "hue",
            Self::Saturation => "saturation",
            Self::Color => "color",
            Self::Luminosity => "luminosity",
        }
    }

    /// The equivalent `peniko` blend mode, for backends built on it.
    ///
    /// `Modulate` has no `peniko` counterpart.
    pub fn to_peniko(self) -> Option<peniko::BlendMode> {
        let compose = |compose| Some(peniko::BlendMode::new(Mix::Normal, compose));
        let mix = |mix| Some(peniko::BlendMode::new(mix, Compose::SrcOver));
        match self {
            Self::Clear => compose(Compose::Clear),
            Self::Src => compose(Compose::Copy),
            Self::Dst => compose(Compose::Dest),
            Self::SrcOver => compose(Compose::SrcOver),
            Self::DstOver => compose(Compose::DestOver),
            Self::SrcIn => compose(Compose::SrcIn),
            Self::DstIn => compose(Compose::DestIn),
            Self::SrcOut => compose(Compose::SrcOut),
            Self::DstOut => compose(Compose::DestOut),
            Self::SrcATop => compose(Compose::SrcAtop),
            Self::DstATop => compose(Compose::DestAtop),
            Self::Xor => compose(Compose::Xor),
            Self::Plus => compose(Compose::Plus),
            Self::Modulate => None,
            Self::Screen => mix(Mix::Screen),
            Self::Overlay => mix(Mix::Overlay),
            Self::Darken => mix(Mix::Darken),
            Self::Lighten => mix(Mix::Lighten),
            Self::ColorDodge => mix(Mix::ColorDodge),
            Self::ColorBurn => mix(Mix::ColorBurn),
            Self::HardLight => mix(Mix::HardLight),
            Self::SoftLight => mix(Mix::SoftLight),
            Self::Difference => mix(Mix::Difference),
            Self::Exclusion => mix(Mix::Exclusion),
            Self::Multiply => mix(Mix::Multiply),
            Self::Hue => mix(Mix::Hue),
            Self::Saturation => mix(Mix::Saturation),
            Self::Color => mix(Mix::Color),
            Self::Luminosity => mix(Mix::Luminosity),
        }
    }
}
