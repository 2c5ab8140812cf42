use std::path::PathBuf;
use std::process::ExitCode;

use figma_audit::{
    download_figma_images, image_fill_requests, map_figma_error, node_render_requests, write_output,
    FigmaAuditError, FigmaClient, ImageFormat,
};
use tracing::info;

use super::load_design;
use crate::cli::SourceArgs;
use crate::formatting::render_error;
use crate::settings::{load_config, resolve_max_depth};

/// Options of the images command besides the design source.
pub struct ImagesArgs {
    pub dest: PathBuf,
    pub render: Vec<String>,
    pub svg: bool,
    pub png_scale: f32,
    pub no_fills: bool,
    pub output: Option<PathBuf>,
}

/// Run the images command.
pub async fn run_images(
    config_path: Option<PathBuf>,
    source: SourceArgs,
    args: ImagesArgs,
) -> ExitCode {
    let output = args.output.as_deref();
    let config = match load_config(config_path.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => return render_error(err, output),
    };
    let Some(file_key) = source.file_key.clone() else {
        return render_error(
            FigmaAuditError::Config("images needs --file-key to resolve download URLs".to_string()),
            output,
        );
    };
    if !(args.png_scale > 0.0 && args.png_scale <= 4.0) {
        return render_error(
            FigmaAuditError::Config(format!(
                "--png-scale must be in (0, 4], got {}",
                args.png_scale
            )),
            output,
        );
    }

    let mut requests = Vec::new();
    if !args.no_fills {
        let design =
            match load_design(&source, &config, resolve_max_depth(source.depth, &config)).await {
                Ok(design) => design,
                Err(err) => return render_error(err, output),
            };
        requests.extend(image_fill_requests(&design.global_vars));
    }
    let format = if args.svg {
        ImageFormat::Svg
    } else {
        ImageFormat::Png
    };
    requests.extend(node_render_requests(&args.render, format));
    info!(requests = requests.len(), dest = %args.dest.display(), "downloading images");

    let client = match config
        .figma_auth()
        .and_then(|auth| {
            FigmaClient::with_settings(auth, &config.figma)
                .map_err(|e| map_figma_error("client setup", e))
        }) {
        Ok(client) => client,
        Err(err) => return render_error(err, output),
    };
    let processed =
        match download_figma_images(&client, &file_key, &requests, &args.dest, args.png_scale)
            .await
        {
            Ok(processed) => processed,
            Err(err) => return render_error(err, output),
        };

    let rendered = match serde_json::to_string_pretty(&processed) {
        Ok(rendered) => rendered,
        Err(err) => return render_error(err.into(), output),
    };
    if let Err(err) = write_output(&rendered, output) {
        return render_error(err, output);
    }
    ExitCode::SUCCESS
}
