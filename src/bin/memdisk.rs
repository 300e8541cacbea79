use std::io::{self, BufRead, Write};

use log::{debug, error, LevelFilter};
use memdisk::{Config, MemDisk, Status, SECTOR_SIZE};
use structopt::StructOpt;

#[derive(StructOpt)]
#[structopt(about = "Drive an in-memory block device from commands on stdin")]
struct Opt {
    /// Device size in 512 byte sectors.
    #[structopt(long, default_value = "16384")]
    sectors: u64,
    /// Logical block size advertised by the device.
    #[structopt(long, default_value = "512")]
    block_size: u32,
    #[structopt(long, default_value = "memd0")]
    name: String,
    /// Increase log verbosity.
    #[structopt(short, long, parse(from_occurrences))]
    verbose: u8,
}

enum Command {
    Geometry,
    Checksum,
    Write { sector: u64, data: Vec<u8> },
    Fill { sector: u64, len: usize, byte: u8 },
    Read { sector: u64, len: usize },
}

fn parse_u64(word: Option<&str>) -> Result<u64, String> {
    let word = word.ok_or_else(|| "missing argument".to_string())?;
    let parsed = match word.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => word.parse(),
    };
    parsed.map_err(|e| format!("bad number {:?}: {}", word, e))
}

fn parse_len(word: Option<&str>) -> Result<usize, String> {
    usize::try_from(parse_u64(word)?).map_err(|_| "length not addressable".to_string())
}

fn parse_hex(word: Option<&str>) -> Result<Vec<u8>, String> {
    let word = word.ok_or_else(|| "missing hex data".to_string())?;
    if !word.is_ascii() || word.len() % 2 != 0 {
        return Err(format!("odd length hex data {:?}", word));
    }
    (0..word.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&word[i..i + 2], 16)
                .map_err(|e| format!("bad hex data {:?}: {}", word, e))
        })
        .collect()
}

fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let mut words = line.split_whitespace();
    let cmd = match words.next() {
        Some(cmd) => cmd,
        None => return Ok(None),
    };
    let command = match cmd {
        "geo" => Command::Geometry,
        "sum" => Command::Checksum,
        "write" => Command::Write {
            sector: parse_u64(words.next())?,
            data: parse_hex(words.next())?,
        },
        "fill" => Command::Fill {
            sector: parse_u64(words.next())?,
            len: parse_len(words.next())?,
            byte: u8::try_from(parse_u64(words.next())?)
                .map_err(|_| "fill byte out of range".to_string())?,
        },
        "read" => Command::Read {
            sector: parse_u64(words.next())?,
            len: parse_len(words.next())?,
        },
        other => return Err(format!("unknown command {:?}", other)),
    };
    Ok(Some(command))
}

fn hex_dump(out: &mut impl Write, sector: u64, data: &[u8]) -> io::Result<()> {
    for (i, chunk) in data.chunks(16).enumerate() {
        write!(out, "{:08x}:", sector * SECTOR_SIZE + (i * 16) as u64)?;
        for byte in chunk {
            write!(out, " {:02x}", byte)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Run one command, returning the request status where a request was made.
fn run(disk: &MemDisk, command: Command, out: &mut impl Write) -> io::Result<Status> {
    match command {
        Command::Geometry => {
            let geo = disk.getgeo();
            writeln!(
                out,
                "cylinders {} heads {} sectors {}",
                geo.cylinders, geo.heads, geo.sectors_per_track
            )?;
            Ok(Status::Success)
        }
        Command::Checksum => {
            writeln!(out, "{:08x}", disk.checksum())?;
            Ok(Status::Success)
        }
        Command::Write { sector, data } => Ok(disk.write_sectors(sector, &data)),
        Command::Fill { sector, len, .. } | Command::Read { sector, len }
            if len as u64 > disk.capacity() =>
        {
            error!("{}: {} bytes at sector {} exceeds the device", disk.name(), len, sector);
            Ok(Status::IoError)
        }
        Command::Fill { sector, len, byte } => Ok(disk.write_sectors(sector, &vec![byte; len])),
        Command::Read { sector, len } => {
            let mut data = vec![0u8; len];
            let status = disk.read_sectors(sector, &mut data);
            if status == Status::Success {
                hex_dump(out, sector, &data)?;
            }
            Ok(status)
        }
    }
}

fn main() {
    let opt = Opt::from_args();

    let level = match opt.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::builder()
        .format_timestamp_nanos()
        .filter_level(level)
        .init();

    let config = Config {
        name: opt.name,
        capacity: opt.sectors.saturating_mul(SECTOR_SIZE),
        logical_block_size: opt.block_size,
    };
    let disk = match MemDisk::new(config) {
        Ok(disk) => disk,
        Err(kind) => {
            error!("Unable to activate device: {:?}", kind);
            std::process::exit(libc::ENOMEM);
        }
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut exit_code = 0;
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!("Failure reading input: {}", e);
                std::process::exit(libc::EIO);
            }
        };
        debug!("command: {}", line);
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(msg) => {
                eprintln!("{}", msg);
                exit_code = libc::EINVAL;
                continue;
            }
        };
        match run(&disk, command, &mut out) {
            Ok(Status::Success) => {}
            Ok(Status::IoError) => {
                eprintln!("{}: I/O error", disk.name());
                exit_code = libc::EIO;
            }
            Err(e) => {
                error!("Failure writing output: {}", e);
                std::process::exit(libc::EIO);
            }
        }
    }
    std::process::exit(exit_code);
}
