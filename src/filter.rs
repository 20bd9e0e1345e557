//! Keeping only the template slide that matches the requested deck size.
use tracing::info;

use crate::common::{Error, Result};
use crate::ooxml::pptx::Package;

/// Deck sizes a request may ask for; 0 keeps the whole template.
pub const VALID_SIZES: [u8; 4] = [0, 1, 2, 4];

/// Template slide used for a deck of `size` cases, `None` for "all slides".
pub fn slide_for_size(size: u8) -> Result<Option<usize>> {
    match size {
        0 => Ok(None),
        1 => Ok(Some(2)),
        2 => Ok(Some(1)),
        4 => Ok(Some(0)),
        other => Err(Error::InvalidRequest(format!(
            "presentation size must be one of 0, 1, 2 or 4 (got {other})"
        ))),
    }
}

/// Drop every slide except the one mapped to `size`.
///
/// Returns the number of slides left.
pub fn filter_slides(package: &mut Package, size: u8) -> Result<usize> {
    let total = package.slide_count()?;
    let Some(keep) = slide_for_size(size)? else {
        info!(slides = total, "keeping all slides");
        return Ok(total);
    };
    if keep >= total {
        return Err(Error::Layout(format!(
            "size {size} needs template slide {} but the template has {total}",
            keep + 1
        )));
    }

    let removed = package.retain_slides(&[keep])?;
    info!(size, kept = keep, removed, "filtered slides");
    Ok(total - removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::pptx::package::tests::{build_pptx, text_shape};

    fn template() -> Package {
        Package::from_bytes(&build_pptx(&[
            &text_shape(2, "Overview", "four"),
            &text_shape(2, "Detail", "two"),
            &text_shape(2, "Single", "one"),
        ]))
        .unwrap()
    }

    fn remaining_names(package: &mut Package) -> Vec<String> {
        let reopened = Package::from_bytes(&package.to_bytes().unwrap()).unwrap();
        reopened
            .slide_partnames()
            .unwrap()
            .iter()
            .map(|p| {
                let slide = reopened.load_slide(p).unwrap();
                let (_, shape) = slide.live_shapes().next().unwrap();
                shape.name().to_string()
            })
            .collect()
    }

    #[test]
    fn test_size_mapping() {
        for (size, expected) in [(1, "Single"), (2, "Detail"), (4, "Overview")] {
            let mut package = template();
            assert_eq!(filter_slides(&mut package, size).unwrap(), 1);
            assert_eq!(remaining_names(&mut package), [expected]);
        }
    }

    #[test]
    fn test_size_zero_keeps_everything() {
        let mut package = template();
        assert_eq!(filter_slides(&mut package, 0).unwrap(), 3);
        assert_eq!(remaining_names(&mut package), ["Overview", "Detail", "Single"]);
    }

    #[test]
    fn test_out_of_range_and_invalid_sizes() {
        let mut short = Package::from_bytes(&build_pptx(&[&text_shape(2, "Overview", "four")])).unwrap();
        assert!(matches!(filter_slides(&mut short, 1), Err(Error::Layout(_))));
        assert!(matches!(filter_slides(&mut template(), 3), Err(Error::InvalidRequest(_))));
    }
}
