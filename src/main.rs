use std::path::PathBuf;

use anyhow::{anyhow, Result};
use shader_debug_transformer::{modify_shader_for_debugging, apply_full_shader_post_processing, Normalize};

#[derive(Debug, Default, Clone)]
struct Cli {
    shader: Option<PathBuf>,
    line: Option<usize>,
    content: String,
    post_normalize: Normalize,
    post_step: Option<f32>,
}

fn parse_cli(args: &[String]) -> Result<Cli> {
    let mut cli = Cli::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--shader" => {
                let Some(v) = args.get(i + 1) else {
                    return Err(anyhow!("missing value for --shader"));
                };
                cli.shader = Some(PathBuf::from(v));
                i += 2;
            }
            "--line" => {
                let Some(v) = args.get(i + 1) else {
                    return Err(anyhow!("missing value for --line"));
                };
                cli.line = Some(
                    v.parse::<usize>()
                        .map_err(|e| anyhow!("invalid --line value {v}: {e}"))?,
                );
                i += 2;
            }
            "--content" => {
                let Some(v) = args.get(i + 1) else {
                    return Err(anyhow!("missing value for --content"));
                };
                cli.content = v.clone();
                i += 2;
            }
            "--post-normalize" => {
                let Some(v) = args.get(i + 1) else {
                    return Err(anyhow!("missing value for --post-normalize"));
                };
                cli.post_normalize = match v.as_str() {
                    "off" => Normalize::Off,
                    "soft" => Normalize::Soft,
                    "abs" => Normalize::Abs,
                    other => {
                        return Err(anyhow!("invalid --post-normalize value: {other} (expected off|soft|abs)"))
                    }
                };
                i += 2;
            }
            "--post-step" => {
                let Some(v) = args.get(i + 1) else {
                    return Err(anyhow!("missing value for --post-step"));
                };
                cli.post_step = Some(
                    v.parse::<f32>()
                        .map_err(|e| anyhow!("invalid --post-step value {v}: {e}"))?,
                );
                i += 2;
            }
            other => {
                return Err(anyhow!(
                    "unknown argument: {other} (supported: --shader <path>, --line <n>, --content <text>, --post-normalize off|soft|abs, --post-step <f32>)"
                ));
            }
        }
    }

    if cli.shader.is_none() {
        return Err(anyhow!("--shader <path> is required"));
    }
    if cli.line.is_none() {
        return Err(anyhow!("--line <n> is required"));
    }

    Ok(cli)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let argv: Vec<String> = std::env::args().skip(1).collect();
    let cli = parse_cli(&argv)?;

    let shader_path = cli.shader.expect("validated by parse_cli");
    let line = cli.line.expect("validated by parse_cli");
    let source = std::fs::read_to_string(&shader_path)
        .map_err(|e| anyhow!("failed to read --shader file {}: {e}", shader_path.display()))?;

    match modify_shader_for_debugging(&source, line, &cli.content, None, None) {
        Some(mut rewritten) => {
            if let Some(post) = apply_full_shader_post_processing(&rewritten, cli.post_normalize, cli.post_step) {
                rewritten = post;
            }
            print!("{rewritten}");
            Ok(())
        }
        None => Err(anyhow!("no debuggable expression on that line")),
    }
}
