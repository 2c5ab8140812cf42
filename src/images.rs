//! Image download and post-processing for image fills and rendered nodes.

use futures::future::join_all;
use image::{DynamicImage, GenericImageView};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::figma::{FigmaClient, ImageFormat};
use crate::types::GlobalVars;

/// 2x3 affine crop `[[sx, 0, tx], [0, sy, ty]]`, in fractions of the image.
pub type CropTransform = [[f64; 3]; 2];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedImage {
    pub file_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_dimensions: Option<ImageDimensions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_dimensions: Option<ImageDimensions>,
    pub was_cropped: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_variables: Option<String>,
}

/// One image to fetch: an image fill (`image_ref`) or a rendered node.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRequest {
    pub node_id: String,
    pub file_name: String,
    pub image_ref: Option<String>,
    pub needs_crop: bool,
    pub crop_transform: Option<CropTransform>,
    pub want_dimensions: bool,
}

impl ImageRequest {
    fn format(&self) -> ImageFormat {
        if self.file_name.to_ascii_lowercase().ends_with(".svg") {
            ImageFormat::Svg
        } else {
            ImageFormat::Png
        }
    }
}

/// Requests for every image fill recorded during simplification.
pub fn image_fill_requests(vars: &GlobalVars) -> Vec<ImageRequest> {
    vars.images
        .iter()
        .map(|(image_ref, reference)| ImageRequest {
            node_id: reference.node_id.clone(),
            file_name: format!("{}.png", image_ref),
            image_ref: Some(image_ref.clone()),
            needs_crop: reference.needs_cropping,
            crop_transform: reference.crop_transform,
            want_dimensions: reference.scale_mode.as_deref() == Some("TILE"),
        })
        .collect()
}

/// Requests that render whole nodes, one file per node id.
pub fn node_render_requests(node_ids: &[String], format: ImageFormat) -> Vec<ImageRequest> {
    node_ids
        .iter()
        .map(|node_id| ImageRequest {
            node_id: node_id.clone(),
            file_name: format!("{}.{}", node_id.replace([':', ';'], "-"), format.as_str()),
            image_ref: None,
            needs_crop: false,
            crop_transform: None,
            want_dimensions: false,
        })
        .collect()
}

fn dimensions(img: &DynamicImage) -> ImageDimensions {
    let (width, height) = img.dimensions();
    ImageDimensions { width, height }
}

/// Crop `img` by `transform`. A zero or negative scale leaves the image
/// untouched; the flag reports whether a crop happened.
pub fn apply_crop(img: DynamicImage, transform: &CropTransform) -> (DynamicImage, bool) {
    let [[sx, _, tx], [_, sy, ty]] = *transform;
    if sx <= 0.0 || sy <= 0.0 {
        warn!(sx, sy, "ignoring crop transform with zero scale");
        return (img, false);
    }

    let (w, h) = img.dimensions();
    let left = ((tx * w as f64).round().max(0.0) as u32).min(w);
    let top = ((ty * h as f64).round().max(0.0) as u32).min(h);
    let width = ((sx * w as f64).round() as u32).min(w - left);
    let height = ((sy * h as f64).round() as u32).min(h - top);
    if width == 0 || height == 0 || (left, top, width, height) == (0, 0, w, h) {
        return (img, false);
    }

    debug!(left, top, width, height, "cropping image");
    (img.crop_imm(left, top, width, height), true)
}

/// Write `bytes` to `dest_dir/file_name`, cropping first when asked.
pub fn process_bytes(
    bytes: &[u8],
    dest_dir: &Path,
    file_name: &str,
    needs_crop: bool,
    crop_transform: Option<&CropTransform>,
    want_dimensions: bool,
) -> Result<ProcessedImage> {
    fs::create_dir_all(dest_dir)?;
    let file_path = dest_dir.join(file_name);

    let transform = crop_transform.filter(|_| needs_crop);
    if transform.is_none() && !want_dimensions {
        fs::write(&file_path, bytes)?;
        return Ok(ProcessedImage {
            file_path,
            original_dimensions: None,
            final_dimensions: None,
            was_cropped: false,
            css_variables: None,
        });
    }

    let img = image::load_from_memory(bytes)?;
    let original = dimensions(&img);
    let (img, was_cropped) = match transform {
        Some(transform) => apply_crop(img, transform),
        None => (img, false),
    };
    let final_dims = dimensions(&img);

    if was_cropped {
        img.save(&file_path)?;
    } else {
        fs::write(&file_path, bytes)?;
    }

    let css_variables = want_dimensions.then(|| {
        format!(
            "--original-width: {}px; --original-height: {}px;",
            final_dims.width, final_dims.height
        )
    });

    Ok(ProcessedImage {
        file_path,
        original_dimensions: Some(original),
        final_dimensions: Some(final_dims),
        was_cropped,
        css_variables,
    })
}

pub async fn download_and_process(
    client: &FigmaClient,
    file_name: &str,
    dest_dir: &Path,
    source_url: &str,
    needs_crop: bool,
    crop_transform: Option<&CropTransform>,
    want_dimensions: bool,
) -> Result<ProcessedImage> {
    let bytes = client.download_image(source_url).await?;
    debug!(file_name, bytes = bytes.len(), "downloaded image");
    process_bytes(
        &bytes,
        dest_dir,
        file_name,
        needs_crop,
        crop_transform,
        want_dimensions,
    )
}

/// Resolve URLs for every request and download them. Individual failures
/// are logged and skipped.
pub async fn download_figma_images(
    client: &FigmaClient,
    file_key: &str,
    requests: &[ImageRequest],
    dest_dir: &Path,
    png_scale: f32,
) -> Result<Vec<ProcessedImage>> {
    let fill_urls = if requests.iter().any(|r| r.image_ref.is_some()) {
        client.get_image_fill_urls(file_key).await?
    } else {
        Default::default()
    };

    let mut render_urls = std::collections::BTreeMap::new();
    for format in [ImageFormat::Png, ImageFormat::Svg] {
        let ids: Vec<&str> = requests
            .iter()
            .filter(|r| r.image_ref.is_none() && r.format() == format)
            .map(|r| r.node_id.as_str())
            .collect();
        render_urls.extend(
            client
                .render_node_images(file_key, &ids, format, png_scale)
                .await?,
        );
    }

    let jobs = requests.iter().filter_map(|request| {
        let url = match &request.image_ref {
            Some(image_ref) => fill_urls.get(image_ref),
            None => render_urls.get(&request.node_id),
        };
        let Some(url) = url else {
            warn!(node_id = %request.node_id, "no download URL for image");
            return None;
        };
        Some(async move {
            let result = download_and_process(
                client,
                &request.file_name,
                dest_dir,
                url,
                request.needs_crop,
                request.crop_transform.as_ref(),
                request.want_dimensions,
            )
            .await;
            (request, result)
        })
    });

    let mut processed = Vec::new();
    for (request, result) in join_all(jobs).await {
        match result {
            Ok(image) => processed.push(image),
            Err(e) => warn!(file_name = %request.file_name, error = %e, "image download failed"),
        }
    }
    info!(requested = requests.len(), saved = processed.len(), "images downloaded");
    Ok(processed)
}
