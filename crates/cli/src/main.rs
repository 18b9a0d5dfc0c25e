mod annotate;
mod config;

use std::path::PathBuf;
use std::process;

use clap::Parser;

use agelens_core::cropping::infrastructure::nearest_cropper::NearestCropper;
use agelens_core::detection::domain::face_locator::FaceLocator;
use agelens_core::detection::infrastructure::seeta_locator::SeetaFaceLocator;
use agelens_core::detection::infrastructure::ultraface_locator::UltrafaceLocator;
use agelens_core::inference::domain::endpoint::ModelEndpoint;
use agelens_core::inference::domain::runner::InferenceRunner;
use agelens_core::inference::infrastructure::onnx_runner::{OnnxRunner, WarmUpShape};
use agelens_core::pipeline::predictor::{FacePredictor, PipelineParts, PredictorTask};
use agelens_core::preprocessing::domain::preprocessor::Preprocessor;
use agelens_core::preprocessing::infrastructure::mean_normalizer::MeanNormalizer;
use agelens_core::preprocessing::infrastructure::scale_normalizer::ScaleNormalizer;

use annotate::{annotate, label_for, DisplayMode};
use config::{AppConfig, LocatorKind};

/// Age and gender estimation for faces in a photograph.
#[derive(Parser)]
#[command(name = "agelens")]
struct Cli {
    /// Input image file.
    input: PathBuf,

    /// Annotated output image (omit to only print results).
    output: Option<PathBuf>,

    /// Pipeline configuration file.
    #[arg(long, default_value = "agelens.json")]
    config: PathBuf,

    /// Which predictions to run and display.
    #[arg(long, value_enum, default_value = "both")]
    mode: DisplayMode,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)?;

    let locator = build_locator(&config)?;
    let preprocessors = build_preprocessors(&config)?;
    let parts = PipelineParts::new(locator, Box::new(NearestCropper))
        .with_preprocessors(preprocessors)
        .with_input_size(config.input_width, config.input_height, config.input_depth);
    let task = build_task(&config, cli.mode)?;

    let mut predictor = FacePredictor::new(parts, task);
    let results = predictor.predict_path(&cli.input)?;

    if results.is_empty() {
        println!("No faces found in {}", cli.input.display());
        return Ok(());
    }

    for (i, result) in results.iter().enumerate() {
        let b = &result.face_box;
        println!(
            "face {i}: [{}, {}, {}, {}] {}",
            b.left,
            b.top,
            b.right,
            b.bottom,
            label_for(result, cli.mode)
        );
    }

    if let Some(output) = &cli.output {
        let mut image = image::open(&cli.input)?.to_rgb8();
        annotate(&mut image, &results);
        image.save(output)?;
        log::info!("annotated image written to {}", output.display());
    }

    Ok(())
}

fn build_locator(config: &AppConfig) -> Result<Box<dyn FaceLocator>, Box<dyn std::error::Error>> {
    let locator: Box<dyn FaceLocator> = match config.locator {
        LocatorKind::Seeta => Box::new(SeetaFaceLocator::new(&config.locator_model)?),
        LocatorKind::Ultraface => Box::new(UltrafaceLocator::new(&config.locator_model)?),
    };
    Ok(locator)
}

fn build_preprocessors(
    config: &AppConfig,
) -> Result<Vec<Box<dyn Preprocessor>>, Box<dyn std::error::Error>> {
    let mut preprocessors: Vec<Box<dyn Preprocessor>> = Vec::new();
    if let Some(rate) = config.scale_rate {
        preprocessors.push(Box::new(ScaleNormalizer::new(rate)));
    }
    if let Some(mean_file) = &config.mean_file {
        preprocessors.push(Box::new(MeanNormalizer::from_json(mean_file)?));
    }
    Ok(preprocessors)
}

fn build_runner(
    config: &AppConfig,
    endpoint: ModelEndpoint,
) -> Result<Box<dyn InferenceRunner>, Box<dyn std::error::Error>> {
    let mut runner = OnnxRunner::with_warm_up(WarmUpShape {
        width: config.input_width,
        height: config.input_height,
        depth: config.input_depth,
    });
    runner.configure(endpoint)?;
    Ok(Box::new(runner))
}

fn build_task(
    config: &AppConfig,
    mode: DisplayMode,
) -> Result<PredictorTask, Box<dyn std::error::Error>> {
    match mode {
        DisplayMode::Age => {
            let model = config
                .age_model
                .as_ref()
                .ok_or("config has no age_model section")?;
            let runner = build_runner(
                config,
                ModelEndpoint::single(&model.path, &model.input_node, &model.output_node),
            )?;
            Ok(PredictorTask::Age {
                runner,
                input_node: model.input_node.clone(),
                output_node: model.output_node.clone(),
            })
        }
        DisplayMode::Gender => {
            let model = config
                .gender_model
                .as_ref()
                .ok_or("config has no gender_model section")?;
            let runner = build_runner(
                config,
                ModelEndpoint::single(&model.path, &model.input_node, &model.output_node),
            )?;
            Ok(PredictorTask::Gender {
                runner,
                input_node: model.input_node.clone(),
                output_node: model.output_node.clone(),
            })
        }
        DisplayMode::Both => {
            let model = config
                .joint_model
                .as_ref()
                .ok_or("config has no joint_model section")?;
            let runner = build_runner(
                config,
                ModelEndpoint::pair(
                    &model.path,
                    &model.input_node,
                    &model.age_output,
                    &model.gender_output,
                ),
            )?;
            Ok(PredictorTask::AgeAndGender {
                runner,
                input_node: model.input_node.clone(),
                age_output: model.age_output.clone(),
                gender_output: model.gender_output.clone(),
            })
        }
    }
}
