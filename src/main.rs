use std::error::Error;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use roadlocalize::{
    FormatType, FormatValue, I18n, I18nBuilder, I18nConfig, Number, TranslateArgs, VerbosityLevel,
};
use tracing::debug;

fn cli() -> Command {
    Command::new("roadlocalize")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Translate keys and format values with roadlocalize catalogs")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("JSON configuration file"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::Count)
                .help("Log fallback resolution (-vv adds the fallback chain)"),
        )
        .subcommand(
            Command::new("translate")
                .about("Resolve a translation key")
                .arg(
                    Arg::new("key")
                        .help("Dotted translation key, e.g. nav.home")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("locale")
                        .long("locale")
                        .short('l')
                        .help("Locale to translate into (default: configured default)"),
                )
                .arg(
                    Arg::new("file")
                        .long("file")
                        .short('f')
                        .action(ArgAction::Append)
                        .help("Load a catalog as LOCALE=PATH (repeatable)"),
                )
                .arg(
                    Arg::new("dir")
                        .long("dir")
                        .short('d')
                        .value_parser(value_parser!(PathBuf))
                        .help("Load every <locale>.json file in a directory"),
                )
                .arg(
                    Arg::new("param")
                        .long("param")
                        .short('p')
                        .action(ArgAction::Append)
                        .help("Interpolation parameter as NAME=VALUE (repeatable)"),
                )
                .arg(
                    Arg::new("count")
                        .long("count")
                        .short('n')
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(i64))
                        .help("Count used to pick the plural form"),
                )
                .arg(
                    Arg::new("default")
                        .long("default")
                        .help("Text returned when the key is missing"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the resolved translation entry as JSON"),
                ),
        )
        .subcommand(
            Command::new("format")
                .about("Format a number, date or datetime for a locale")
                .arg(
                    Arg::new("value")
                        .help("Value: a number, YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS")
                        .required(true)
                        .allow_negative_numbers(true)
                        .index(1),
                )
                .arg(
                    Arg::new("type")
                        .long("type")
                        .short('t')
                        .value_parser(["auto", "number", "currency", "date", "percentage"])
                        .default_value("auto")
                        .help("How to render the value"),
                )
                .arg(
                    Arg::new("locale")
                        .long("locale")
                        .short('l')
                        .help("Locale whose conventions to use"),
                ),
        )
        .subcommand(Command::new("locales").about("List registered locales as JSON"))
}

fn main() -> Result<(), Box<dyn Error>> {
    let matches = cli().get_matches();
    let verbose = matches.get_count("verbose");

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(log_level(verbose).parse()?),
        )
        .init();

    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => I18nConfig::from_file(path)?,
        None => I18nConfig::default(),
    };
    debug!("Using configuration: {:?}", config);

    let mut builder = I18nBuilder::from_config(&config);
    if verbose > 0 {
        builder = builder.verbosity(VerbosityLevel::Verbose);
    }
    let i18n = builder.build()?;

    match matches.subcommand() {
        Some(("translate", sub)) => translate(&i18n, sub),
        Some(("format", sub)) => format(&i18n, sub),
        Some(("locales", _)) => {
            let infos: Vec<_> = i18n
                .available_locales()
                .iter()
                .filter_map(|code| i18n.store().get_locale(code))
                .map(|locale| locale.info())
                .collect();
            println!("{}", serde_json::to_string_pretty(&infos)?);
            Ok(())
        }
        _ => unreachable!("a subcommand is required"),
    }
}

/// Fallback hits are logged at debug and the full chain at trace.
fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

fn split_pair<'a>(raw: &'a str, what: &str) -> Result<(&'a str, &'a str), Box<dyn Error>> {
    raw.split_once('=')
        .ok_or_else(|| format!("Expected {} as NAME=VALUE, got '{}'", what, raw).into())
}

fn translate(i18n: &I18n, matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    if let Some(dir) = matches.get_one::<PathBuf>("dir") {
        i18n.load_dir(dir)?;
    }
    for file in matches.get_many::<String>("file").into_iter().flatten() {
        let (locale, path) = split_pair(file, "--file")?;
        i18n.load_file(locale, Path::new(path))?;
    }

    let key = matches
        .get_one::<String>("key")
        .ok_or("missing translation key")?;
    let mut args = TranslateArgs::new();
    if let Some(locale) = matches.get_one::<String>("locale") {
        args = args.locale(locale);
    }
    for param in matches.get_many::<String>("param").into_iter().flatten() {
        let (name, value) = split_pair(param, "--param")?;
        args = args.param(name, value);
    }
    if let Some(count) = matches.get_one::<i64>("count") {
        args = args.count(*count);
    }
    if let Some(default) = matches.get_one::<String>("default") {
        args = args.default_text(default);
    }

    let text = i18n.t(key, &args);
    if !matches.get_flag("json") {
        println!("{}", text);
        return Ok(());
    }

    let requested = args.locale.clone().unwrap_or_else(|| i18n.get_locale());
    let translator = i18n.translator();
    let entry = translator
        .candidate_locales(&requested)
        .into_iter()
        .find_map(|locale| i18n.store().get_translation(locale, key));
    let report = serde_json::json!({
        "key": key,
        "requested_locale": requested,
        "text": text,
        "entry": entry.as_deref(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn parse_value(raw: &str) -> FormatValue {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return FormatValue::Date(date);
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return FormatValue::DateTime(datetime);
    }
    match raw.parse::<Number>() {
        Ok(number) => FormatValue::Number(number),
        Err(_) => FormatValue::Text(raw.to_string()),
    }
}

fn format(i18n: &I18n, matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let raw = matches
        .get_one::<String>("value")
        .ok_or("missing value to format")?;
    let format_type: FormatType = matches
        .get_one::<String>("type")
        .map_or(Ok(FormatType::Auto), |name| name.parse())?;
    if let Some(locale) = matches.get_one::<String>("locale") {
        i18n.set_locale(locale);
    }

    println!("{}", i18n.format(parse_value(raw), format_type));
    Ok(())
}
