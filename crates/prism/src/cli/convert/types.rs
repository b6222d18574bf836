//! CLI enum types and value parsers for the convert command.

use clap::ValueEnum;
use prism_core::{OutputFormat, Rotation};

/// Output formats accepted on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// JPEG at fixed quality 90
    #[value(alias = "jpg")]
    Jpeg,
    /// PNG with default compression
    Png,
    /// Lossless WebP
    Webp,
    /// TIFF
    #[value(alias = "tif")]
    Tiff,
    /// GIF
    Gif,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Jpeg => OutputFormat::Jpeg,
            FormatArg::Png => OutputFormat::Png,
            FormatArg::Webp => OutputFormat::Webp,
            FormatArg::Tiff => OutputFormat::Tiff,
            FormatArg::Gif => OutputFormat::Gif,
        }
    }
}

/// Parse a rotation in degrees; only 0, 90, 180 and 270 are accepted.
pub fn parse_rotation(value: &str) -> Result<Rotation, String> {
    let degrees: u32 = value
        .trim()
        .parse()
        .map_err(|_| format!("{value} is not a whole number of degrees"))?;
    Rotation::try_from(degrees).map_err(|e| e.to_string())
}
