//! CLI for iugflyer - university flyer generation.

use clap::{Args, Parser, Subcommand, ValueEnum};
use iugflyer::flyer::content::Part;
use iugflyer::flyer::prompt::build_instruction;
use iugflyer::status::with_status;
use iugflyer::{
    encode_file, encode_files, BackgroundPreset, FlyerController, FlyerDispatcher, FlyerRequest,
    GeminiClient, GeminiModel, Language, TextPosition,
};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "iugflyer")]
#[command(about = "Generate Institut Universitaire La Grâce flyers via Gemini")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a flyer and save it as PNG
    Generate(GenerateArgs),

    /// Print the instruction and part layout without calling the API
    Prompt(FormArgs),

    /// List languages, text positions and color presets
    Options,
}

#[derive(Args)]
struct FormArgs {
    /// Theme of the flyer (e.g. "Admissions ouvertes 2025-2026")
    description: String,

    /// Language of all flyer text
    #[arg(short, long, value_enum, default_value = "french")]
    language: LanguageArg,

    /// Background colors, free text
    #[arg(short, long, conflicts_with = "preset")]
    background: Option<String>,

    /// Background color preset
    #[arg(long, value_enum)]
    preset: Option<PresetArg>,

    /// Placement of the flyer text
    #[arg(short, long, value_enum, default_value = "bottom")]
    position: PositionArg,

    /// Extra phone numbers appended to the official ones
    #[arg(long, default_value = "")]
    phones: String,

    /// User photo (repeat for several; order is kept)
    #[arg(short, long = "image")]
    images: Vec<PathBuf>,

    /// Official logo image
    #[arg(long)]
    logo: Option<PathBuf>,
}

#[derive(Args)]
struct GenerateArgs {
    #[command(flatten)]
    form: FormArgs,

    /// Directory the PNG is written to
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// Gemini model
    #[arg(short, long, value_enum, default_value = "flash")]
    model: ModelArg,

    /// API key (falls back to GOOGLE_API_KEY, then API_KEY)
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LanguageArg {
    French,
    English,
}

impl From<LanguageArg> for Language {
    fn from(arg: LanguageArg) -> Self {
        match arg {
            LanguageArg::French => Language::French,
            LanguageArg::English => Language::English,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PositionArg {
    Top,
    Bottom,
    Left,
    Right,
    OverlayLeft,
    OverlayCenter,
    OverlayRight,
}

impl From<PositionArg> for TextPosition {
    fn from(arg: PositionArg) -> Self {
        match arg {
            PositionArg::Top => TextPosition::Top,
            PositionArg::Bottom => TextPosition::Bottom,
            PositionArg::Left => TextPosition::Left,
            PositionArg::Right => TextPosition::Right,
            PositionArg::OverlayLeft => TextPosition::OverlayLeft,
            PositionArg::OverlayCenter => TextPosition::OverlayCenter,
            PositionArg::OverlayRight => TextPosition::OverlayRight,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PresetArg {
    Institutional,
    NavyGold,
    Grey,
    Green,
}

impl From<PresetArg> for BackgroundPreset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Institutional => BackgroundPreset::Institutional,
            PresetArg::NavyGold => BackgroundPreset::NavyGold,
            PresetArg::Grey => BackgroundPreset::ProfessionalGrey,
            PresetArg::Green => BackgroundPreset::AcademicGreen,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModelArg {
    Flash,
    Pro,
}

impl From<ModelArg> for GeminiModel {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::Flash => GeminiModel::NanoBanana,
            ModelArg::Pro => GeminiModel::NanoBananaPro,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("iugflyer=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => generate(args, cli.json).await?,
        Commands::Prompt(args) => print_prompt(args, cli.json).await?,
        Commands::Options => list_options(cli.json)?,
    }

    Ok(())
}

/// Turns the form flags into a request, encoding any files.
async fn read_form(args: &FormArgs) -> anyhow::Result<FlyerRequest> {
    let mut request = FlyerRequest::new(&args.description)
        .with_language(args.language.into())
        .with_text_position(args.position.into())
        .with_extra_phones(&args.phones);
    match (&args.background, args.preset) {
        (Some(colors), _) => request = request.with_background_color(colors),
        (None, Some(preset)) => {
            request = request.with_background_color(BackgroundPreset::from(preset).colors())
        }
        (None, None) => {}
    }
    request.user_images = encode_files(&args.images).await?;
    if let Some(ref logo) = args.logo {
        request = request.with_logo(encode_file(logo).await?);
    }
    Ok(request)
}

async fn generate(args: GenerateArgs, json_output: bool) -> anyhow::Result<()> {
    let mut builder = GeminiClient::builder();
    if let Some(key) = args.api_key {
        builder = builder.api_key(key);
    }
    if let Some(secs) = args.timeout {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    let client = builder.build()?;

    let model: GeminiModel = args.model.into();
    let request = read_form(&args.form).await?;
    let form = FlyerController::new(FlyerDispatcher::new(client, model.as_str()));
    form.set_description(request.description);
    form.set_language(request.language);
    form.set_background_color(request.background_color);
    form.set_text_position(request.text_position);
    form.set_extra_phones(request.extra_phones);
    form.add_user_images(request.user_images);
    if let Some(logo) = request.logo {
        form.set_logo(logo);
    }

    let result = with_status(form.submit(), |msg| {
        if !json_output {
            eprint!("\r\x1b[2K{}", msg);
            let _ = std::io::stderr().flush();
        }
    })
    .await;
    if !json_output {
        eprintln!();
    }

    if let Err(e) = result {
        let message = form.error().unwrap_or_else(|| e.user_message());
        if json_output {
            let out = serde_json::json!({ "success": false, "error": message });
            println!("{}", serde_json::to_string_pretty(&out)?);
            std::process::exit(1);
        }
        anyhow::bail!(message);
    }

    std::fs::create_dir_all(&args.out_dir)?;
    let path = form.download(&args.out_dir)?;
    let flyer = form
        .snapshot()
        .generated
        .ok_or_else(|| anyhow::anyhow!("flyer vanished after generation"))?;

    if json_output {
        let out = serde_json::json!({
            "success": true,
            "output": path.display().to_string(),
            "mime_type": flyer.mime_type(),
            "model": flyer.metadata.model,
            "duration_ms": flyer.metadata.duration_ms,
            "user_images": args.form.images.len(),
            "logo": args.form.logo.is_some(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("Generated flyer: {}", path.display());
        if let Some(duration) = flyer.metadata.duration_ms {
            println!("Duration: {}ms", duration);
        }
    }

    Ok(())
}

async fn print_prompt(args: FormArgs, json_output: bool) -> anyhow::Result<()> {
    let request = read_form(&args).await?;
    let instruction = build_instruction(&request);
    let layout: Vec<String> = iugflyer::flyer::build_parts(&request)
        .iter()
        .map(|part| match part {
            Part::Text { text } => format!("text ({} chars)", text.chars().count()),
            Part::InlineData { inline_data } => format!(
                "{} ({} base64 chars)",
                inline_data.mime_type,
                inline_data.data.len()
            ),
        })
        .collect();

    if json_output {
        let out = serde_json::json!({
            "instruction": instruction,
            "parts": layout,
            "aspect_ratio": iugflyer::flyer::FLYER_ASPECT_RATIO,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{}", instruction);
        println!("Parts:");
        for (i, part) in layout.iter().enumerate() {
            println!("  {}. {}", i + 1, part);
        }
    }

    Ok(())
}

fn list_options(json_output: bool) -> anyhow::Result<()> {
    if json_output {
        let out = serde_json::json!({
            "languages": Language::ALL.iter().map(|l| l.as_str()).collect::<Vec<_>>(),
            "text_positions": TextPosition::ALL.iter().map(|p| p.label()).collect::<Vec<_>>(),
            "presets": BackgroundPreset::ALL
                .iter()
                .map(|p| serde_json::json!({ "name": p.name(), "colors": p.colors() }))
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("LANGUAGES:");
        for language in Language::ALL {
            println!("  {} ({})", language, language.description_hint());
        }
        println!("\nTEXT POSITIONS:");
        for position in TextPosition::ALL {
            println!("  {}", position);
        }
        println!("\nBACKGROUND PRESETS:");
        for preset in BackgroundPreset::ALL {
            println!("  {}: {}", preset.name(), preset.colors());
        }
    }
    Ok(())
}
