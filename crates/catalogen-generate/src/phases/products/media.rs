use catalogen_core::IdKind;
use rand::Rng;

use crate::errors::GenerationError;
use crate::output::{Row, SqlValue, TableId};
use crate::phases::products::{NewProduct, push_attribute_value};
use crate::state::GeneratorState;

/// Media path of the `n`th image: `/<c0>/<c1>/<stem>_<n:02>.jpg`.
pub fn image_path(stem: &str, n: u32) -> String {
    let file = format!("{stem}_{n:02}.jpg");
    let mut chars = file.chars();
    let first = chars.next().unwrap_or('_');
    let second = chars.next().unwrap_or('_');
    format!("/{first}/{second}/{file}")
}

/// Adds `image.min..=max` gallery images to the product and records each
/// path in the manifest. The first image becomes the base, small and
/// thumbnail image.
pub(crate) fn attach_images(
    state: &mut GeneratorState<'_>,
    product: &NewProduct,
) -> Result<(), GenerationError> {
    let Some(image) = state.config.catalog.product.image.as_ref() else {
        return Ok(());
    };
    let bounds = image.bounds();
    let count = state.rng.random_range(bounds.min..=bounds.max);
    if count == 0 {
        return Ok(());
    }

    let gallery = state.metadata.product_attribute("media_gallery")?;
    let stem = product.sku.image_stem();
    for n in 1..=count {
        let path = image_path(&stem, n);
        let value_id = state.ids.next(IdKind::MediaGallery);

        state.output.push(
            TableId::MediaGallery,
            Row::new()
                .with("value_id", value_id)
                .with("attribute_id", gallery.attribute_id)
                .with("value", path.as_str())
                .with("media_type", "image")
                .with("disabled", 0_i64),
        );
        state.output.push(
            TableId::MediaGalleryValue,
            Row::new()
                .with("value_id", value_id)
                .with("store_id", 0_i64)
                .with("row_id", product.id)
                .with("label", SqlValue::Null)
                .with("position", n)
                .with("disabled", 0_i64),
        );
        state.output.push(
            TableId::MediaValueToEntity,
            Row::new()
                .with("value_id", value_id)
                .with("row_id", product.id),
        );
        state.output.push_manifest(&path)?;

        if n == 1 {
            for code in ["image", "small_image", "thumbnail"] {
                push_attribute_value(state, product.id, code, path.as_str().into())?;
            }
        }
    }
    Ok(())
}
