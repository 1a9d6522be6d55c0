//! bestream - Inspect big-endian binary files field by field
//!
//! This tool reads a file either straight from disk or from an in-memory
//! copy, optionally restricted to a byte range, and decodes fixed-width
//! big-endian fields, peeks at upcoming values, or hashes the range.

use anyhow::{Context, Result};
use bestream_core::{FileStream, MemoryStream, ReadableStream};
use clap::{Parser, Subcommand, ValueEnum};
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, trace, Level};
use tracing_subscriber::EnvFilter;

/// Chunk size used when hashing a range
const DIGEST_CHUNK: usize = 64 * 1024;

/// Inspect big-endian binary files field by field
#[derive(Parser, Debug)]
#[command(name = "bestream")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Binary file to inspect
    file: PathBuf,

    /// Load the whole file into memory instead of reading it from disk
    #[arg(
        long,
        env = "BESTREAM_MEMORY",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    memory: bool,

    /// Number of bytes to skip before reading
    #[arg(long, default_value = "0")]
    offset: u64,

    /// Restrict reading to this many bytes after the offset (memory only)
    #[arg(long, requires = "memory")]
    length: Option<u64>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a comma separated layout, e.g. `u32,u16,skip:2,bytes:4,u8`
    Fields {
        /// Field list: u8, u16, u32, u64, skip:N or bytes:N
        #[arg(value_delimiter = ',', required = true)]
        layout: Vec<Field>,
    },

    /// Show the next value without consuming it
    Peek {
        /// Width of the value to peek at
        #[arg(value_enum)]
        width: Width,
    },

    /// Print the blake3 hash of the selected range
    Digest,

    /// Print the position and number of bytes left in the selected range
    Info,
}

/// Fixed integer widths supported by the stream accessors
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Width {
    U8,
    U16,
    U32,
    U64,
}

impl Width {
    fn size(self) -> usize {
        match self {
            Width::U8 => 1,
            Width::U16 => 2,
            Width::U32 => 4,
            Width::U64 => 8,
        }
    }

    fn read(self, stream: &mut dyn ReadableStream) -> bestream_core::Result<u64> {
        Ok(match self {
            Width::U8 => stream.get_u8()?.into(),
            Width::U16 => stream.get_be_u16()?.into(),
            Width::U32 => stream.get_be_u32()?.into(),
            Width::U64 => stream.get_be_u64()?,
        })
    }

    fn peek(self, stream: &mut dyn ReadableStream) -> bestream_core::Result<u64> {
        Ok(match self {
            Width::U8 => stream.peek_u8()?.into(),
            Width::U16 => stream.peek_be_u16()?.into(),
            Width::U32 => stream.peek_be_u32()?.into(),
            Width::U64 => stream.peek_be_u64()?,
        })
    }

    fn format(self, value: u64) -> String {
        format!("{:#0w$x} ({})", value, value, w = 2 + 2 * self.size())
    }
}

impl fmt::Display for Width {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Width::U8 => "u8",
            Width::U16 => "u16",
            Width::U32 => "u32",
            Width::U64 => "u64",
        };
        f.pad(name)
    }
}

/// One entry of a `fields` layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    /// A big-endian integer
    Int(Width),
    /// Bytes to step over
    Skip(u64),
    /// Raw bytes printed as hex
    Bytes(usize),
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "u8" => return Ok(Field::Int(Width::U8)),
            "u16" => return Ok(Field::Int(Width::U16)),
            "u32" => return Ok(Field::Int(Width::U32)),
            "u64" => return Ok(Field::Int(Width::U64)),
            _ => {}
        }

        let (kind, count) = s
            .split_once(':')
            .ok_or_else(|| format!("unknown field '{}'", s))?;
        let count: u64 = count
            .parse()
            .map_err(|_| format!("invalid byte count in '{}'", s))?;

        match kind {
            "skip" => Ok(Field::Skip(count)),
            "bytes" => usize::try_from(count)
                .map(Field::Bytes)
                .map_err(|_| format!("byte count too large in '{}'", s)),
            _ => Err(format!("unknown field '{}'", s)),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Int(width) => fmt::Display::fmt(width, f),
            Field::Skip(n) => f.pad(&format!("skip:{}", n)),
            Field::Bytes(n) => f.pad(&format!("bytes:{}", n)),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if cli.memory {
        process_in_memory(&cli, &mut out)
    } else {
        process_from_disk(&cli, &mut out)
    }
}

/// Read the file through a `FileStream`
fn process_from_disk(cli: &Cli, out: &mut dyn Write) -> Result<()> {
    let mut stream = FileStream::open(&cli.file)
        .with_context(|| format!("Failed to open input file: {}", cli.file.display()))?;

    if cli.offset > 0 {
        stream
            .skip(cli.offset)
            .with_context(|| format!("Failed to skip to offset {}", cli.offset))?;
    }

    info!("Reading {} from disk", cli.file.display());
    execute(&cli.command, &mut stream, out)
}

/// Load the file and read it through a `MemoryStream` window
fn process_in_memory(cli: &Cli, out: &mut dyn Write) -> Result<()> {
    let data = read_input(&cli.file)?;
    let mut stream = select_range(&data, cli.offset, cli.length)?;

    info!(
        "Reading {} from memory, bytes {}..{}",
        cli.file.display(),
        stream.position(),
        stream.bound()
    );
    execute(&cli.command, &mut stream, out)
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    trace!("Reading {}", path.display());
    let data = fs::read(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;
    trace!("Read {} bytes from {}", data.len(), path.display());
    Ok(data)
}

/// Build a stream over `data` starting at `offset`, optionally narrowed to
/// `length` bytes.
fn select_range(data: &[u8], offset: u64, length: Option<u64>) -> Result<MemoryStream<'_>> {
    let mut stream = MemoryStream::new(data);
    stream
        .skip(offset)
        .with_context(|| format!("Offset {} is past the end of the input", offset))?;

    match length {
        Some(length) => {
            let length = usize::try_from(length).context("Length does not fit in memory")?;
            let window = stream
                .window(length)
                .with_context(|| format!("Range {}+{} exceeds the input", offset, length))?;
            debug!("Selected window {}..{}", window.position(), window.bound());
            Ok(window)
        }
        None => Ok(stream),
    }
}

/// Run a subcommand against any stream
fn execute(
    command: &Command,
    stream: &mut dyn ReadableStream,
    out: &mut dyn Write,
) -> Result<()> {
    match command {
        Command::Fields { layout } => decode_fields(layout, stream, out),
        Command::Peek { width } => {
            let offset = stream.position();
            let value = width
                .peek(stream)
                .with_context(|| format!("Failed to peek {} at offset {}", width, offset))?;
            writeln!(out, "{:>8}  {:<8}  {}", offset, width, width.format(value))?;
            Ok(())
        }
        Command::Digest => {
            let (hash, count) = digest(stream)?;
            writeln!(out, "{}  {} bytes", hash.to_hex(), count)?;
            Ok(())
        }
        Command::Info => {
            let left = stream.left_bytes()?;
            writeln!(out, "position: {}", stream.position())?;
            writeln!(out, "left:     {}", left)?;
            writeln!(out, "eof:      {}", stream.is_eof())?;
            Ok(())
        }
    }
}

/// Decode each field of the layout in order, one output line per field
fn decode_fields(
    layout: &[Field],
    stream: &mut dyn ReadableStream,
    out: &mut dyn Write,
) -> Result<()> {
    for (i, field) in layout.iter().enumerate() {
        let offset = stream.position();
        let context = || format!("Field #{} ({}) at offset {}", i + 1, field, offset);

        match *field {
            Field::Int(width) => {
                let value = width.read(stream).with_context(context)?;
                writeln!(out, "{:>8}  {:<8}  {}", offset, width, width.format(value))?;
            }
            Field::Skip(n) => {
                stream.skip(n).with_context(context)?;
                trace!("Skipped {} bytes at offset {}", n, offset);
            }
            Field::Bytes(n) => {
                let mut buf = vec![0u8; n];
                stream.read_exact(&mut buf).with_context(context)?;
                writeln!(out, "{:>8}  {:<8}  {}", offset, field, hex(&buf))?;
            }
        }
    }

    Ok(())
}

/// Hash everything left in the stream
fn digest(stream: &mut dyn ReadableStream) -> Result<(blake3::Hash, u64)> {
    let mut hasher = blake3::Hasher::new();
    let mut buf = vec![0u8; DIGEST_CHUNK];
    let mut total = 0u64;

    loop {
        let n = stream
            .read(&mut buf)
            .with_context(|| format!("Failed to read at offset {}", stream.position()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        total += n as u64;
    }

    debug!("Hashed {} bytes", total);
    Ok((hasher.finalize(), total))
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
