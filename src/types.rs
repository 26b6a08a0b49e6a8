use fixed::types::I32F32;

pub const CSS_DPI: f32 = 96.0;
pub const MM_PER_INCH: f32 = 25.4;

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
pub const HEADER_HEIGHT_PX: f32 = 60.0;
pub const FOOTER_HEIGHT_PX: f32 = 60.0;
// Slack kept between the bands and the body so content does not touch the rules.
pub const BODY_BUFFER_PX: f32 = 32.0;

pub fn mm_to_px(mm: f32) -> f32 {
    mm / MM_PER_INCH * CSS_DPI
}

/// CSS pixel length, quantized to 1/1000 px so geometry is stable across runs.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Px(I32F32);

impl Px {
    pub const ZERO: Px = Px(I32F32::from_bits(0));

    pub fn from_f32(value: f32) -> Px {
        if !value.is_finite() {
            return Px::ZERO;
        }
        let milli = (value as f64 * 1000.0).round();
        let milli = milli.clamp(i64::MIN as f64, i64::MAX as f64) as i64;
        Px::from_milli_i64(milli)
    }

    pub fn from_mm(mm: f32) -> Px {
        Px::from_f32(mm_to_px(mm))
    }

    pub fn to_milli_i64(self) -> i64 {
        let bits = self.0.to_bits() as i128;
        let denom = 1i128 << 32;
        let scaled = bits * 1000;
        let adj = if scaled >= 0 { denom / 2 } else { -denom / 2 };
        let milli = (scaled + adj) / denom;
        milli.clamp(i64::MIN as i128, i64::MAX as i128) as i64
    }

    pub fn max(self, other: Px) -> Px {
        if self >= other { self } else { other }
    }

    pub fn is_positive(self) -> bool {
        self.to_milli_i64() > 0
    }

    /// CSS length with three decimals, trailing zeros trimmed (`793.701px`, `60px`).
    pub fn css(self) -> String {
        let milli = self.to_milli_i64();
        let sign = if milli < 0 { "-" } else { "" };
        let abs = milli.unsigned_abs();
        let int_part = abs / 1000;
        let frac_part = abs % 1000;
        if frac_part == 0 {
            return format!("{sign}{int_part}px");
        }
        let frac = format!("{frac_part:03}");
        format!("{sign}{int_part}.{}px", frac.trim_end_matches('0'))
    }

    pub fn from_milli_i64(milli: i64) -> Px {
        let milli = milli as i128;
        let denom = 1i128 << 32;
        let adj = if milli >= 0 { 500 } else { -500 };
        let bits = (milli * denom + adj) / 1000;
        let bits = bits.clamp(i64::MIN as i128, i64::MAX as i128) as i64;
        Px(I32F32::from_bits(bits))
    }
}

impl std::ops::Add for Px {
    type Output = Px;
    fn add(self, rhs: Px) -> Px {
        Px::from_milli_i64(self.to_milli_i64().saturating_add(rhs.to_milli_i64()))
    }
}

impl std::ops::Sub for Px {
    type Output = Px;
    fn sub(self, rhs: Px) -> Px {
        Px::from_milli_i64(self.to_milli_i64().saturating_sub(rhs.to_milli_i64()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: Px,
    pub height: Px,
}

impl Size {
    pub fn a4() -> Self {
        Self::from_mm(PAGE_WIDTH_MM, PAGE_HEIGHT_MM)
    }

    pub fn from_mm(width_mm: f32, height_mm: f32) -> Self {
        Self {
            width: Px::from_mm(width_mm),
            height: Px::from_mm(height_mm),
        }
    }
}

/// Frame geometry shared by every preview page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub size: Size,
    pub header_height: Px,
    pub footer_height: Px,
    pub body_buffer: Px,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            size: Size::a4(),
            header_height: Px::from_f32(HEADER_HEIGHT_PX),
            footer_height: Px::from_f32(FOOTER_HEIGHT_PX),
            body_buffer: Px::from_f32(BODY_BUFFER_PX),
        }
    }
}

impl PageGeometry {
    /// Height left for page content. Advisory: fragments are never measured against it.
    pub fn body_height(&self) -> Px {
        (self.size.height - self.header_height - self.footer_height - self.body_buffer)
            .max(Px::ZERO)
    }
}
