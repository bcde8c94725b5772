//! glint — one-way optical file transfer, sender side.
//!
//! `glint send` cycles a file's frame sequence as QR codes in the terminal.
//! The receiver points a camera at the screen; there is no return channel.
//! The operator presses Enter once the receiver reports success (Completed)
//! or Ctrl-C to give up (Aborted).

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use glint_core::config::{EcLevel, GlintConfig};
use glint_engine::{FrameKind, FramePosition, SessionState, SymbolAdapter, TransferSession};

mod qr;
mod term;

use qr::QrSymbolRenderer;

// ── Argument handling ─────────────────────────────────────────────────────────

struct SendArgs {
    file: PathBuf,
    config: GlintConfig,
}

fn parse_args(mut args: Vec<String>, mut config: GlintConfig) -> Result<SendArgs> {
    let mut file = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--chunk-size" => {
                i += 1;
                config.transfer.chunk_size = arg_value(&args, i, "--chunk-size")?;
            }
            "--repeat" => {
                i += 1;
                config.transfer.repetition_factor = arg_value(&args, i, "--repeat")?;
            }
            "--group" => {
                i += 1;
                config.transfer.parity_group_size = arg_value(&args, i, "--group")?;
            }
            "--no-parity" => config.transfer.parity = false,
            "--interval" => {
                i += 1;
                config.display.frame_interval_ms = arg_value(&args, i, "--interval")?;
            }
            "--ec" => {
                i += 1;
                let level = args.get(i).context("--ec requires a value")?;
                config.display.error_correction = match level.as_str() {
                    "low" => EcLevel::Low,
                    "medium" => EcLevel::Medium,
                    "quartile" => EcLevel::Quartile,
                    "high" => EcLevel::High,
                    other => bail!("unknown error-correction level: {other}"),
                };
            }
            flag if flag.starts_with("--") => bail!("unknown flag: {flag}"),
            _ => {
                if file.is_some() {
                    bail!("only one file per transfer");
                }
                file = Some(PathBuf::from(std::mem::take(&mut args[i])));
            }
        }
        i += 1;
    }

    Ok(SendArgs {
        file: file.context("no file given")?,
        config,
    })
}

fn arg_value<T: std::str::FromStr>(args: &[String], i: usize, flag: &str) -> Result<T> {
    args.get(i)
        .with_context(|| format!("{flag} requires a value"))?
        .parse()
        .map_err(|_| anyhow::anyhow!("{flag} must be a number"))
}

fn print_usage() {
    println!("Usage: glint <command> [options]");
    println!();
    println!("Commands:");
    println!("  send <file>      Display the file as a cyclic QR sequence");
    println!("  inspect <file>   Print the schedule without displaying it");
    println!();
    println!("Options:");
    println!("  --chunk-size <bytes>   File bytes per frame (default from config)");
    println!("  --repeat <n>           Passes per cycle");
    println!("  --group <n>            Chunks per XOR parity group");
    println!("  --no-parity            Disable parity frames");
    println!("  --interval <ms>        Dwell time per frame");
    println!("  --ec <level>           low | medium | quartile | high");
}

// ── Session setup ─────────────────────────────────────────────────────────────

fn build_session(args: &SendArgs) -> Result<(TransferSession, SymbolAdapter<QrSymbolRenderer>)> {
    args.config
        .display
        .validate()
        .map_err(|knob| anyhow::anyhow!(knob))?;
    let adapter = SymbolAdapter::new(QrSymbolRenderer, args.config.display.error_correction);
    let max = adapter.max_chunk_size();
    if args.config.transfer.chunk_size > max {
        bail!(
            "chunk_size {} exceeds the {} bytes a symbol holds at this error-correction level",
            args.config.transfer.chunk_size,
            max
        );
    }

    let mut session = TransferSession::new();
    session
        .load(&args.file, &args.config.transfer)
        .with_context(|| format!("failed to prepare {}", args.file.display()))?;
    Ok((session, adapter))
}

fn print_summary(session: &TransferSession, args: &SendArgs) {
    let meta = session.meta().expect("session was just built");
    let seq = session.sequence().expect("session was just built");
    let cycle_secs = (seq.len() as u64 * args.config.display.frame_interval_ms) as f64 / 1000.0;

    println!("  File       : {} ({} bytes)", meta.filename, meta.total_bytes);
    println!("  Digest     : {}", hex::encode(meta.content_hash));
    println!("  Session    : {}", hex::encode(meta.session_id));
    println!(
        "  Chunks     : {} x {} bytes",
        meta.total_chunks, meta.chunk_size
    );
    println!(
        "  Cycle      : {} frames ({} passes, {} parity groups), ~{:.1}s",
        seq.len(),
        seq.passes(),
        seq.parity_groups(),
        cycle_secs
    );
}

// ── Commands ──────────────────────────────────────────────────────────────────

async fn cmd_send(args: SendArgs) -> Result<()> {
    let (mut session, adapter) = build_session(&args)?;
    print_summary(&session, &args);
    println!();
    println!("Point the receiver's camera at the screen.");
    println!("Press Enter when the receiver reports completion; Ctrl-C aborts.");
    tokio::time::sleep(Duration::from_secs(2)).await;

    let interval = Duration::from_millis(args.config.display.frame_interval_ms);
    let mut frames = session.start(interval)?;

    let confirm = wait_for_confirm(BufReader::new(tokio::io::stdin()));
    tokio::pin!(confirm);
    show_frame(&adapter, &frames.borrow().clone(), &session)?;

    loop {
        tokio::select! {
            changed = frames.changed() => {
                if changed.is_err() {
                    break; // clock gone
                }
                let pos = frames.borrow().clone();
                show_frame(&adapter, &pos, &session)?;
            }
            res = &mut confirm => {
                res?;
                session.stop();
                break;
            }
            _ = tokio::signal::ctrl_c() => {
                session.cancel();
                break;
            }
        }
    }

    match session.state() {
        SessionState::Completed => println!("\nTransfer marked complete."),
        SessionState::Aborted => println!("\nTransfer aborted."),
        other => println!("\nSession ended in state {other:?}."),
    }
    Ok(())
}

/// Resolve when the operator presses Enter. At end-of-input (stdin closed or
/// redirected from an empty source) there is no Enter coming; pend forever so
/// the select loop is left to the frame clock and Ctrl-C, rather than a
/// closed stdin resolving on every iteration.
async fn wait_for_confirm<R: AsyncBufRead + Unpin>(reader: R) -> std::io::Result<()> {
    match reader.lines().next_line().await? {
        Some(_) => Ok(()),
        None => std::future::pending().await,
    }
}

fn show_frame(
    adapter: &SymbolAdapter<QrSymbolRenderer>,
    pos: &FramePosition,
    session: &TransferSession,
) -> Result<()> {
    let matrix = adapter.render_frame(&pos.frame)?;
    let seq_len = session
        .sequence()
        .map(|s| s.len())
        .unwrap_or_default();
    let total_chunks = session
        .meta()
        .map(|m| m.total_chunks)
        .unwrap_or_default();

    let label = match pos.frame.kind {
        FrameKind::Header => "header".to_string(),
        FrameKind::Data { chunk_index } => {
            format!("chunk {}/{}", chunk_index + 1, total_chunks)
        }
        FrameKind::Parity { group_id } => format!("parity group {group_id}"),
    };

    term::clear();
    term::draw_matrix(&matrix);
    println!(
        "frame {}/{}  cycle {}  {}",
        pos.index + 1,
        seq_len,
        pos.cycle + 1,
        label
    );
    Ok(())
}

async fn cmd_inspect(args: SendArgs) -> Result<()> {
    let (session, adapter) = build_session(&args)?;
    print_summary(&session, &args);

    let meta = session.meta().expect("session was just built");
    let seq = session.sequence().expect("session was just built");
    let cycle_secs = (seq.len() as u64 * args.config.display.frame_interval_ms) as f64 / 1000.0;

    println!(
        "  Capacity   : {} bytes/symbol at this level, chunk fits with {} spare",
        adapter.max_frame_bytes(),
        adapter.max_chunk_size() - meta.chunk_size
    );
    println!(
        "  Throughput : ~{:.0} bytes/s of unique content per cycle",
        meta.total_bytes as f64 / cycle_secs
    );
    Ok(())
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = GlintConfig::write_default_if_missing() {
        tracing::warn!(error = %e, "failed to write default config");
    }
    let config = GlintConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load config, using defaults");
        GlintConfig::default()
    });

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.split_first() {
        Some((cmd, rest)) if cmd == "send" => {
            cmd_send(parse_args(rest.to_vec(), config)?).await
        }
        Some((cmd, rest)) if cmd == "inspect" => {
            cmd_inspect(parse_args(rest.to_vec(), config)?).await
        }
        Some((cmd, _)) if cmd == "help" || cmd == "--help" || cmd == "-h" => {
            print_usage();
            Ok(())
        }
        Some((cmd, _)) => {
            eprintln!("Unknown command: {cmd}");
            print_usage();
            std::process::exit(1);
        }
        None => {
            print_usage();
            Ok(())
        }
    }
}
