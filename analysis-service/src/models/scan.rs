use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Imaging modality selected by the user on upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Mri,
    Xray,
}

impl Modality {
    pub const ALL: [Modality; 2] = [Modality::Mri, Modality::Xray];

    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::Mri => "mri",
            Modality::Xray => "xray",
        }
    }

    /// Label used in report headings, e.g. `MRI`, `XRAY`.
    pub fn display_name(&self) -> &'static str {
        match self {
            Modality::Mri => "MRI",
            Modality::Xray => "XRAY",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Modality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mri" => Ok(Modality::Mri),
            "xray" => Ok(Modality::Xray),
            other => Err(format!(
                "Invalid image type '{}'. Expected 'mri' or 'xray'.",
                other
            )),
        }
    }
}

/// An image as received from the upload form. Lives for one request.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub modality: Modality,
    pub file_name: String,
}

impl UploadedImage {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Classifier-ready image: fixed dimensions, JPEG encoded.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    bytes: Vec<u8>,
    width: u32,
    height: u32,
}

impl PreparedImage {
    pub const MIME_TYPE: &'static str = "image/jpeg";

    pub(crate) fn new(bytes: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            bytes,
            width,
            height,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn mime_type(&self) -> &'static str {
        Self::MIME_TYPE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modality_parses_known_values() {
        assert_eq!("mri".parse::<Modality>().unwrap(), Modality::Mri);
        assert_eq!("xray".parse::<Modality>().unwrap(), Modality::Xray);
    }

    #[test]
    fn modality_rejects_unknown_and_mixed_case() {
        assert!("ct".parse::<Modality>().is_err());
        assert!("MRI".parse::<Modality>().is_err());
        assert!("".parse::<Modality>().is_err());
    }

    #[test]
    fn modality_display_round_trips_through_as_str() {
        for modality in Modality::ALL {
            assert_eq!(modality.to_string().parse::<Modality>().unwrap(), modality);
        }
        assert_eq!(Modality::Xray.display_name(), "XRAY");
    }
}
