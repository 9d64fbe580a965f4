use clap::{Arg, ArgAction, Command};
use ct2_bridge::{Device, ModelFormat, Translator, into_top_hypotheses};
use ct2_bridge_mt::{
    Config, EngineKind, Language, ModelDownloader, ModelRegistry, OfflineTranslator,
    TranslationVecOutput, family_from_name, init_logging, whitespace_loader,
};
use std::io::{self, BufRead};
use std::path::PathBuf;
use tracing::debug;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = Command::new("ct2-mt")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Offline machine translation with CTranslate2 models")
        .arg(
            Arg::new("text")
                .help("Text to translate (read from stdin, one per line, when omitted)")
                .num_args(0..)
                .index(1),
        )
        .arg(
            Arg::new("to")
                .long("to")
                .short('t')
                .help("Target language code (e.g., en, fr, ja)")
                .required_unless_present("print-config"),
        )
        .arg(
            Arg::new("from")
                .long("from")
                .short('f')
                .help("Source language code (default: inferred or unknown)"),
        )
        .arg(
            Arg::new("model")
                .long("model")
                .help("Model family: jparacrawl-{small,base,big}, sugoi, m2m100-{418m,1.2b}, nllb-{600m,1.3b-distilled,1.3b,3.3b}"),
        )
        .arg(
            Arg::new("device")
                .long("device")
                .short('d')
                .help("Device: cpu, cuda or auto"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .help("Model format: compact (quantized) or normal"),
        )
        .arg(
            Arg::new("models-dir")
                .long("models-dir")
                .help("Directory holding downloaded models"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Path to config.toml"),
        )
        .arg(
            Arg::new("mock")
                .long("mock")
                .short('m')
                .help("Use the mock engine instead of CTranslate2")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("download")
                .long("download")
                .help("Download missing model files before translating")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("tokens")
                .long("tokens")
                .help("Input is pre-tokenized (whitespace separated); print the best tokens")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print the result as JSON")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("print-config")
                .long("print-config")
                .help("Print the default configuration and exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Show detailed translation process")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    if matches.get_flag("print-config") {
        print!("{}", Config::sample_toml()?);
        return Ok(());
    }

    let verbose = matches.get_flag("verbose");
    let config_path = matches.get_one::<String>("config").map(PathBuf::from);
    let mut config = Config::load(config_path.as_deref())?;
    init_logging(&config.logging, verbose)?;

    // Command-line flags override the config file
    if let Some(model) = matches.get_one::<String>("model") {
        config.model = model.clone();
    }
    if let Some(device) = matches.get_one::<String>("device") {
        config.device = device.parse::<Device>()?;
    }
    if let Some(format) = matches.get_one::<String>("format") {
        config.model_format = format.parse::<ModelFormat>()?;
    }
    if let Some(dir) = matches.get_one::<String>("models-dir") {
        config.models_dir = PathBuf::from(dir);
    }
    if matches.get_flag("mock") {
        config.engine = EngineKind::Mock;
    }

    let to: Language = matches
        .get_one::<String>("to")
        .ok_or("missing --to")?
        .parse()?;
    let from = Language::parse_optional(matches.get_one::<String>("from").map(|s| s.as_str()))?;
    let texts = read_texts(matches.get_many::<String>("text"))?;
    if texts.is_empty() {
        return Err("nothing to translate".into());
    }

    let family = family_from_name(&config.model)?;
    let registry = ModelRegistry::builtin();
    let entry = registry.entry_for(family.as_ref(), config.device, config.model_format)?;
    let downloader =
        ModelDownloader::new(&config.models_dir).with_endpoint(config.hub.endpoint.clone());

    let model_dir = if matches.get_flag("download") {
        downloader.ensure(entry).await?
    } else {
        downloader.model_dir(entry)
    };

    if verbose {
        eprintln!("📦 Model: {} ({})", entry.id, model_dir.display());
        eprintln!("⚙️  Engine: {} on {}", config.engine, config.device);
        eprintln!(
            "🌍 {} → {}",
            from.map(|l| l.to_string())
                .unwrap_or_else(|| "auto".to_string()),
            to
        );
        eprintln!();
    }

    let engine = config.engine.build()?;

    if matches.get_flag("tokens") {
        let pair = family.resolve_pair(from, to)?;
        let dir = family.translator_dir(&model_dir, &pair)?;
        debug!("Translating pre-tokenized input with {}", dir.display());

        let translator =
            Translator::with_options(engine.as_ref(), &dir, config.translator_options())?;
        let source: Vec<Vec<String>> = texts
            .iter()
            .map(|t| t.split_whitespace().map(String::from).collect())
            .collect();
        let results = translator.translate_batch_with(&source, &config.batch_options())?;
        translator.dispose()?;
        let best = into_top_hypotheses(results)?;

        if matches.get_flag("json") {
            println!("{}", serde_json::to_string_pretty(&best)?);
        } else {
            for tokens in best {
                println!("{}", tokens.join(" "));
            }
        }
        return Ok(());
    }

    let mut builder = OfflineTranslator::builder(family, engine, model_dir)
        .translator_options(config.translator_options())
        .batch_options(config.batch_options())
        .lifetime(config.lifetime);
    if config.engine == EngineKind::Mock {
        builder = builder.tokenizer_loader(whitespace_loader());
    }
    let translator = builder.build();

    let output: TranslationVecOutput = tokio::task::spawn_blocking({
        let translator = translator.clone();
        move || translator.translate_vec(&texts, from, to)
    })
    .await??;
    translator.unload_all()?;

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        for line in &output.text {
            println!("{}", line);
        }
    }

    Ok(())
}

fn read_texts<'a>(
    args: Option<impl Iterator<Item = &'a String>>,
) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    if let Some(args) = args {
        return Ok(args.cloned().collect());
    }
    let mut texts = Vec::new();
    for line in io::stdin().lock().lines() {
        let line = line?;
        if !line.trim().is_empty() {
            texts.push(line);
        }
    }
    Ok(texts)
}
