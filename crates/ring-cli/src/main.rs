use std::error::Error;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use ring_ai::{
    ChatCompletionsClient, ConceptGenerator, DEFAULT_API_BASE, DEFAULT_MODEL, MAX_PROMPT_CHARS,
    MIN_PROMPT_CHARS, ProviderConfig, build_concept_prompt, interpret_response,
};
use ring_geometry::{build_ring, idle_motion};
use ring_params::{clean_symbols, normalize};
use serde::Serialize;
use serde_json::Value;

type DynError = Box<dyn Error>;

const LEGACY_API_KEY_VAR: &str = "groq_api";

#[derive(Debug, Parser)]
#[command(name = "ring-cli", about = "Inspect and generate parametric ring designs")]
struct Cli {
    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Normalize a parameter object into a complete, valid set.
    Normalize(InputArgs),
    /// Clean a JSON list into display symbols.
    Symbols(InputArgs),
    /// Build the ring scene for a (normalized) parameter object.
    Scene(InputArgs),
    /// Interpret a raw provider answer the way the service does.
    Interpret(InputArgs),
    /// Idle pose of the ring after the given number of seconds.
    Motion {
        #[arg(long)]
        seconds: f64,
        #[arg(long, default_value_t = 0.0)]
        twist: f64,
    },
    /// Print the instruction sent to the provider for a story.
    Prompt { story: String },
    /// Generate a concept for a story through the configured provider.
    Generate(GenerateArgs),
}

#[derive(Debug, Args)]
struct InputArgs {
    /// JSON file to read; standard input when omitted or `-`.
    #[arg(long, short)]
    input: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct GenerateArgs {
    story: String,

    #[arg(long, env = "GROQ_API_BASE", default_value = DEFAULT_API_BASE)]
    api_base: String,

    #[arg(long, env = "GROQ_TEXT_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

fn main() -> Result<(), DynError> {
    let cli = Cli::parse();
    let output = match cli.command {
        Command::Normalize(args) => run_normalize(&read_input(args.input.as_deref())?, cli.pretty)?,
        Command::Symbols(args) => run_symbols(&read_input(args.input.as_deref())?, cli.pretty)?,
        Command::Scene(args) => run_scene(&read_input(args.input.as_deref())?, cli.pretty)?,
        Command::Interpret(args) => run_interpret(&read_input(args.input.as_deref())?, cli.pretty)?,
        Command::Motion { seconds, twist } => to_json(&idle_motion(seconds, twist), cli.pretty)?,
        Command::Prompt { story } => build_concept_prompt(&story),
        Command::Generate(args) => run_generate(args, cli.pretty)?,
    };
    println!("{output}");
    Ok(())
}

fn run_normalize(input: &str, pretty: bool) -> Result<String, DynError> {
    let raw = parse_value(input)?;
    to_json(&normalize(&raw), pretty)
}

fn run_symbols(input: &str, pretty: bool) -> Result<String, DynError> {
    let raw = parse_value(input)?;
    to_json(&clean_symbols(&raw), pretty)
}

fn run_scene(input: &str, pretty: bool) -> Result<String, DynError> {
    let raw = parse_value(input)?;
    to_json(&build_ring(&normalize(&raw)), pretty)
}

/// Raw provider text is taken as is, so malformed answers show their fallback.
fn run_interpret(input: &str, pretty: bool) -> Result<String, DynError> {
    to_json(&interpret_response(input.trim()), pretty)
}

fn run_generate(args: GenerateArgs, pretty: bool) -> Result<String, DynError> {
    check_story(&args.story)?;

    let legacy_key = std::env::var(LEGACY_API_KEY_VAR).ok();
    let raw_key = args.api_key.as_deref().or(legacy_key.as_deref());
    let config = ProviderConfig {
        api_base: args.api_base,
        model: args.model,
        ..ProviderConfig::default()
    }
    .with_api_key(raw_key);

    let generator = ConceptGenerator::new(ChatCompletionsClient::new(config));
    let draft = generator.generate_concept(&args.story)?;
    to_json(&draft, pretty)
}

fn check_story(story: &str) -> Result<(), DynError> {
    let length = story.chars().count();
    if !(MIN_PROMPT_CHARS..=MAX_PROMPT_CHARS).contains(&length) {
        return Err(format!(
            "story must be {MIN_PROMPT_CHARS} to {MAX_PROMPT_CHARS} characters, got {length}"
        )
        .into());
    }
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String, DynError> {
    match path {
        Some(path) if path != Path::new("-") => Ok(fs::read_to_string(path)?),
        _ => {
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input)?;
            Ok(input)
        }
    }
}

fn parse_value(input: &str) -> Result<Value, DynError> {
    serde_json::from_str(input).map_err(|err| format!("input is not valid JSON: {err}").into())
}

fn to_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String, DynError> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(text)
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use ring_params::{DEFAULT_PARAMS, DesignParams};
    use serde_json::Value;

    use super::{
        Cli, Command, check_story, read_input, run_interpret, run_normalize, run_scene,
        run_symbols,
    };

    #[test]
    fn normalizes_partial_objects() {
        let output =
            run_normalize(r#"{"gemCount": 4, "unknown": true}"#, false).expect("should normalize");
        let params: DesignParams = serde_json::from_str(&output).expect("output should parse");
        assert_eq!(
            params,
            DesignParams {
                gem_count: 4,
                ..DEFAULT_PARAMS
            }
        );
    }

    #[test]
    fn rejects_non_json_input() {
        let error = run_normalize("bandRadius=1", false).expect_err("should reject");
        assert!(error.to_string().starts_with("input is not valid JSON"));
    }

    #[test]
    fn cleans_symbol_lists() {
        let output = run_symbols(r#"[" Rose ", "rose", "ROSE", "Diamond"]"#, false)
            .expect("should clean symbols");
        assert_eq!(output, r#"["Rose","Diamond"]"#);
    }

    #[test]
    fn builds_scene_json() {
        let output = run_scene(r#"{"gemCount": 2, "engraving": "dots"}"#, true)
            .expect("should build scene");
        let scene: Value = serde_json::from_str(&output).expect("scene should parse");
        let children = scene["root"]["children"]
            .as_array()
            .expect("ring should have children");
        assert_eq!(children.len(), 4);
        assert_eq!(children[1]["kind"], "pattern");
    }

    #[test]
    fn interprets_raw_answers() {
        let output = run_interpret("not json\n", false).expect("should interpret");
        let draft: Value = serde_json::from_str(&output).expect("draft should parse");
        assert_eq!(draft["symbols"][0], "Abstract");
        assert_eq!(draft["designParams"]["finish"], "yellow_gold");
    }

    #[test]
    fn story_length_is_bounded() {
        assert!(check_story("too short").is_err());
        assert!(check_story("long enough story").is_ok());
        assert!(check_story(&"x".repeat(1001)).is_err());
    }

    #[test]
    fn reads_input_files() {
        let path = std::env::temp_dir().join("ring_cli_input_test.json");
        std::fs::write(&path, "{\"twist\": 0.5}").expect("should write test input");

        let input = read_input(Some(&path)).expect("should read input");
        assert_eq!(input, "{\"twist\": 0.5}");

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn parses_motion_subcommand() {
        let cli = Cli::try_parse_from(["ring-cli", "motion", "--seconds", "2.5", "--twist", "1"])
            .expect("arguments should parse");
        assert!(matches!(
            cli.command,
            Command::Motion { seconds, twist } if seconds == 2.5 && twist == 1.0
        ));
    }
}
