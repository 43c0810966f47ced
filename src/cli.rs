// Command-line front end for postpack.
//
// Subcommands encode and decode value files, inspect encoded streams, and
// print build configuration.

use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};

use crate::codec::{BLOCK_SIZE, MAX_WIDTH, MINI_BLOCK_SIZE};
use crate::engine::{self, StreamLayout};
use crate::io::{self, FileOptions, ValueFormat};

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Delta bit-packing codec for sorted u32 sequences.
#[derive(Parser, Debug)]
#[command(
    name = "postpack",
    version,
    about = "Postings list compressor for sorted u32 sequences",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output stats as JSON to stderr.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Compress a file of values.
    Encode(EncodeArgs),
    /// Decompress an encoded file back to values.
    Decode(DecodeArgs),
    /// Print the block layout of an encoded file.
    Inspect(InspectArgs),
    /// Print build/configuration details.
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    /// Little-endian u32 words.
    Binary,
    /// One decimal value per line.
    Text,
}

impl From<FormatArg> for ValueFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Binary => ValueFormat::Binary,
            FormatArg::Text => ValueFormat::Text,
        }
    }
}

#[derive(Args, Debug)]
struct EncodeArgs {
    /// Format of the input values.
    #[arg(long, value_enum, default_value_t = FormatArg::Binary)]
    format: FormatArg,

    /// Encode blocks on all cores (requires the `parallel` feature).
    #[arg(long)]
    parallel: bool,

    /// Input value file.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Output encoded file.
    #[arg(value_hint = ValueHint::FilePath)]
    output: PathBuf,
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// Format of the output values.
    #[arg(long, value_enum, default_value_t = FormatArg::Binary)]
    format: FormatArg,

    /// Input encoded file.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Output value file.
    #[arg(value_hint = ValueHint::FilePath)]
    output: PathBuf,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Encoded input file.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,
}

// ---------------------------------------------------------------------------
// Resolved command + options (flattened from Cli)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Encode,
    Decode,
    Inspect,
    Config,
}

#[derive(Debug)]
struct Options {
    command: Command,
    force: bool,
    quiet: bool,
    verbose: u8,
    json_output: bool,
    format: ValueFormat,
    parallel: bool,
    input_file: Option<PathBuf>,
    output_file: Option<PathBuf>,
}

fn resolve_options(cli: Cli) -> Options {
    let base = Options {
        command: Command::Config,
        force: cli.force,
        quiet: cli.quiet,
        verbose: cli.verbose.min(2),
        json_output: cli.json_output,
        format: ValueFormat::Binary,
        parallel: false,
        input_file: None,
        output_file: None,
    };

    match cli.command {
        Cmd::Encode(args) => Options {
            command: Command::Encode,
            format: args.format.into(),
            parallel: args.parallel,
            input_file: Some(args.input),
            output_file: Some(args.output),
            ..base
        },
        Cmd::Decode(args) => Options {
            command: Command::Decode,
            format: args.format.into(),
            input_file: Some(args.input),
            output_file: Some(args.output),
            ..base
        },
        Cmd::Inspect(args) => Options {
            command: Command::Inspect,
            input_file: Some(args.input),
            ..base
        },
        Cmd::Config => base,
    }
}

fn file_options(opts: &Options) -> FileOptions {
    FileOptions {
        format: opts.format,
        parallel: opts.parallel,
    }
}

fn log_filter(opts: &Options) -> &'static str {
    if opts.quiet {
        return "error";
    }
    match opts.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn hex(digest: &[u8]) -> String {
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Input and output paths of an encode/decode command.
fn io_paths<'a>(opts: &'a Options, cmd: &str) -> Option<(&'a Path, &'a Path)> {
    match (&opts.input_file, &opts.output_file) {
        (Some(i), Some(o)) => Some((i.as_path(), o.as_path())),
        _ => {
            eprintln!("postpack: {cmd}: missing input or output path");
            None
        }
    }
}

fn check_overwrite(path: &Path, opts: &Options) -> bool {
    if path.exists() && !opts.force {
        eprintln!(
            "postpack: output file exists, use -f to overwrite: {}",
            path.display()
        );
        return false;
    }
    true
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_encode(opts: &Options) -> i32 {
    let Some((input, output)) = io_paths(opts, "encode") else {
        return 1;
    };
    if !check_overwrite(output, opts) {
        return 1;
    }

    let stats = match io::encode_file(input, output, file_options(opts)) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("postpack: encode: {e}");
            return 1;
        }
    };

    if opts.json_output {
        let json = serde_json::json!({
            "values": stats.values,
            "blocks": stats.blocks,
            "words": stats.words,
            "input_bytes": stats.input_size,
            "output_bytes": stats.output_size,
            "words_per_value": stats.ratio(),
            "sha256": stats.values_sha256.map(|d| hex(&d)),
        });
        match serde_json::to_string_pretty(&json) {
            Ok(s) => eprintln!("{s}"),
            Err(e) => log::warn!("cannot render stats: {e}"),
        }
    } else if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "postpack: encode: {} values -> {} words ({:.3} words/value)",
            stats.values,
            stats.words,
            stats.ratio()
        );
    }
    0
}

fn cmd_decode(opts: &Options) -> i32 {
    let Some((input, output)) = io_paths(opts, "decode") else {
        return 1;
    };
    if !check_overwrite(output, opts) {
        return 1;
    }

    let stats = match io::decode_file(input, output, file_options(opts)) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("postpack: decode: {e}");
            return 1;
        }
    };

    if opts.json_output {
        let json = serde_json::json!({
            "words": stats.words,
            "values": stats.values,
            "blocks": stats.blocks,
            "input_bytes": stats.input_size,
            "output_bytes": stats.output_size,
            "sha256": stats.values_sha256.map(|d| hex(&d)),
        });
        match serde_json::to_string_pretty(&json) {
            Ok(s) => eprintln!("{s}"),
            Err(e) => log::warn!("cannot render stats: {e}"),
        }
    } else if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "postpack: decode: {} words -> {} values",
            stats.words, stats.values
        );
    }
    0
}

fn cmd_inspect(opts: &Options) -> i32 {
    let Some(input) = opts.input_file.as_deref() else {
        eprintln!("postpack: inspect: missing input path");
        return 1;
    };

    let layout = match io::read_words(input).and_then(|w| engine::inspect(&w).map_err(Into::into)) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("postpack: inspect: {e}");
            return 1;
        }
    };

    if opts.json_output {
        let json = layout_json(&layout, opts.verbose > 0);
        match serde_json::to_string_pretty(&json) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                eprintln!("postpack: inspect: {e}");
                return 1;
            }
        }
    } else {
        print!("{}", layout_text(&layout, opts.verbose > 0));
    }
    0
}

fn layout_json(layout: &StreamLayout, per_block: bool) -> serde_json::Value {
    let histogram: Vec<usize> = layout.width_histogram().to_vec();
    let mut json = serde_json::json!({
        "elements": layout.elements(),
        "words": layout.words(),
        "block_elements": layout.block_elements,
        "block_words": layout.block_words,
        "blocks": layout.headers.len(),
        "tail_elements": layout.tail_elements,
        "tail_words": layout.tail_words,
        "width_histogram": histogram,
    });
    if per_block {
        let widths: Vec<[u32; 4]> = layout.headers.iter().map(|h| h.widths).collect();
        json["block_widths"] = serde_json::json!(widths);
    }
    json
}

fn layout_text(layout: &StreamLayout, per_block: bool) -> String {
    let mut out = String::new();
    out.push_str(&format!("elements:        {}\n", layout.elements()));
    out.push_str(&format!("words:           {}\n", layout.words()));
    out.push_str(&format!(
        "blocks:          {} ({} elements, {} words)\n",
        layout.headers.len(),
        layout.block_elements,
        layout.block_words
    ));
    out.push_str(&format!(
        "tail:            {} elements, {} words\n",
        layout.tail_elements, layout.tail_words
    ));

    let histogram = layout.width_histogram();
    if histogram.iter().any(|&c| c > 0) {
        out.push_str("width histogram:\n");
        for (w, &count) in histogram.iter().enumerate().filter(|(_, c)| **c > 0) {
            out.push_str(&format!("  {w:>2} bits: {count}\n"));
        }
    }
    if per_block {
        for (i, h) in layout.headers.iter().enumerate() {
            let [a, b, c, d] = h.widths;
            out.push_str(&format!("  block {i:>6}: {a:>2} {b:>2} {c:>2} {d:>2}\n"));
        }
    }
    out
}

fn cmd_config() -> i32 {
    println!("postpack {}", env!("CARGO_PKG_VERSION"));
    println!("block size:      {BLOCK_SIZE}");
    println!("mini-block size: {MINI_BLOCK_SIZE}");
    println!("max bit width:   {MAX_WIDTH}");
    println!("file-io:         {}", cfg!(feature = "file-io"));
    println!("parallel:        {}", cfg!(feature = "parallel"));
    0
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    let cli = Cli::parse();
    let opts = resolve_options(cli);

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_filter(&opts)))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let exit_code = match opts.command {
        Command::Encode => cmd_encode(&opts),
        Command::Decode => cmd_decode(&opts),
        Command::Inspect => cmd_inspect(&opts),
        Command::Config => cmd_config(),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_opts(args: &[&str]) -> Options {
        let argv: Vec<String> = std::iter::once("postpack".to_string())
            .chain(args.iter().map(|s| s.to_string()))
            .collect();
        let cli = Cli::try_parse_from(argv).expect("cli parse failed");
        resolve_options(cli)
    }

    #[test]
    fn encode_subcommand_maps_correctly() {
        let opts = parse_opts(&["encode", "--format", "text", "--parallel", "in.txt", "out.pp"]);
        assert_eq!(opts.command, Command::Encode);
        assert_eq!(opts.format, ValueFormat::Text);
        assert!(opts.parallel);
        assert_eq!(opts.input_file, Some(PathBuf::from("in.txt")));
        assert_eq!(opts.output_file, Some(PathBuf::from("out.pp")));
    }

    #[test]
    fn decode_subcommand_maps_correctly() {
        let opts = parse_opts(&["--quiet", "decode", "in.pp", "out.bin"]);
        assert_eq!(opts.command, Command::Decode);
        assert_eq!(opts.format, ValueFormat::Binary);
        assert!(!opts.parallel);
        assert!(opts.quiet);
        assert_eq!(log_filter(&opts), "error");
    }

    #[test]
    fn global_flags_after_subcommand() {
        let opts = parse_opts(&["inspect", "--json", "-f", "in.pp"]);
        assert_eq!(opts.command, Command::Inspect);
        assert!(opts.json_output);
        assert!(opts.force);
        assert!(opts.output_file.is_none());
    }

    #[test]
    fn verbose_is_capped() {
        let opts = parse_opts(&["-vvv", "config"]);
        assert_eq!(opts.verbose, 2);
        assert_eq!(log_filter(&opts), "debug");
        assert_eq!(parse_opts(&["-v", "config"]).verbose, 1);
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        let argv = ["postpack", "-q", "-v", "config"];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn missing_paths_rejected() {
        assert!(Cli::try_parse_from(["postpack", "encode", "only-one"]).is_err());
    }

    #[test]
    fn layout_text_lists_histogram() {
        let input: Vec<u32> = (0..300).collect();
        let words = engine::compress_to_vec(&input).unwrap();
        let layout = engine::inspect(&words).unwrap();
        let text = layout_text(&layout, true);
        assert!(text.contains("elements:        300"));
        assert!(text.contains("blocks:          2"));
        assert!(text.contains("   1 bits: 8"));
        assert!(text.contains("block      1"));

        let json = layout_json(&layout, true);
        assert_eq!(json["tail_elements"], 44);
        assert_eq!(json["block_widths"][0][0], 1);
    }
}
