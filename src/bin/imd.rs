//! Interactive IMD console application

use imdmanager::*;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

/// Command completer for the REPL
struct CommandCompleter {
    commands: Vec<&'static str>,
}

impl CommandCompleter {
    fn new() -> Self {
        Self {
            commands: vec![
                "exit",
                "help",
                "info",
                "load",
                "map",
                "open",
                "quit",
                "read-sector",
                "save",
                "sectors",
                "summary",
                "tracks",
                "verify",
            ],
        }
    }
}

impl Completer for CommandCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        // Only complete the first word (command name)
        let line_to_cursor = &line[..pos];
        if line_to_cursor.contains(' ') {
            return Ok((pos, vec![]));
        }

        let prefix = line_to_cursor.to_lowercase();
        let matches: Vec<Pair> = self
            .commands
            .iter()
            .filter(|cmd| cmd.starts_with(&prefix))
            .map(|cmd| Pair {
                display: cmd.to_string(),
                replacement: cmd.to_string(),
            })
            .collect();

        Ok((0, matches))
    }
}

impl Hinter for CommandCompleter {
    type Hint = String;
}

impl Highlighter for CommandCompleter {}
impl Validator for CommandCompleter {}
impl Helper for CommandCompleter {}

/// An image opened in the console
struct OpenImage {
    path: String,
    disk: Disk,
}

/// Get the path to the history file
fn history_path() -> Option<std::path::PathBuf> {
    dirs::home_dir().map(|mut p| {
        p.push(".imdmanager_history");
        p
    })
}

fn open_image(path: &str) -> Option<OpenImage> {
    match Disk::open(path) {
        Ok(disk) => {
            println!("Opened: {} ({} tracks)", path, disk.track_count());
            Some(OpenImage {
                path: path.to_string(),
                disk,
            })
        }
        Err(e) => {
            println!("Error: {}", e);
            None
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    println!("=== IMDManager ===");
    println!("Interactive console for exploring ImageDisk (IMD) floppy images.");
    println!("Type 'help' for available commands\n");

    let mut rl = match Editor::new() {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("Failed to create line editor: {}", e);
            std::process::exit(1);
        }
    };
    rl.set_helper(Some(CommandCompleter::new()));

    if let Some(history_path) = history_path() {
        let _ = rl.load_history(&history_path);
    }

    let mut image: Option<OpenImage> = std::env::args().nth(1).and_then(|p| open_image(&p));

    loop {
        let readline = rl.readline("> ");
        let input = match readline {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                if let Some(history_path) = history_path() {
                    let _ = rl.save_history(&history_path);
                }
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        };

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        let _ = rl.add_history_entry(input);

        let parts = parse_command_line(input);
        if parts.is_empty() {
            continue;
        }
        let command = parts[0].to_lowercase();

        match command.as_str() {
            "help" => {
                print_help();
            }
            "quit" | "exit" => {
                if let Some(history_path) = history_path() {
                    let _ = rl.save_history(&history_path);
                }
                println!("Goodbye!");
                break;
            }
            "open" | "load" => {
                if parts.len() < 2 {
                    println!("Usage: open <path>");
                    continue;
                }
                if let Some(opened) = open_image(&parts[1]) {
                    image = Some(opened);
                }
            }
            "info" => {
                if let Some(ref img) = image {
                    print_info(img);
                } else {
                    println!("No image loaded. Use 'open <path>' first.");
                }
            }
            "tracks" => {
                if let Some(ref img) = image {
                    list_tracks(&img.disk);
                } else {
                    println!("No image loaded.");
                }
            }
            "sectors" => {
                if let Some(ref img) = image {
                    if parts.len() >= 2 {
                        match parts[1].parse::<usize>() {
                            Ok(index) => list_sectors_on_track(&img.disk, index),
                            Err(_) => println!("Usage: sectors [track_index]"),
                        }
                    } else {
                        for index in 0..img.disk.track_count() {
                            list_sectors_on_track(&img.disk, index);
                        }
                    }
                } else {
                    println!("No image loaded.");
                }
            }
            "read-sector" => {
                if let Some(ref img) = image {
                    if parts.len() < 3 {
                        println!("Usage: read-sector <track_index> <sector>");
                        continue;
                    }
                    let index: usize = parts[1].parse().unwrap_or(0);
                    let Some(sector) = parse_hex_or_dec(&parts[2]) else {
                        println!("Invalid sector number: {}", parts[2]);
                        continue;
                    };
                    match img.disk.tracks().get(index) {
                        Some(track) => match track.get_record(sector) {
                            Some(record) => {
                                println!(
                                    "Track {} (C{} H{}) sector {}: {}",
                                    index,
                                    track.cylinder(),
                                    track.head(),
                                    sector,
                                    record.record_type()
                                );
                                match record.expanded(track.sector_size().bytes()) {
                                    Some(data) => print_hex_dump(&data, 256),
                                    None => println!("No data available."),
                                }
                            }
                            None => println!("Sector {} not found on track {}.", sector, index),
                        },
                        None => println!("Track {} not found.", index),
                    }
                } else {
                    println!("No image loaded.");
                }
            }
            "map" => {
                if let Some(ref img) = image {
                    let head: u8 = if parts.len() >= 2 {
                        parts[1].parse().unwrap_or(0)
                    } else {
                        0
                    };
                    print!("{}", map::render_sector_map(&img.disk, head));
                } else {
                    println!("No image loaded.");
                }
            }
            "summary" => {
                let paths: Vec<String> = if parts.len() >= 2 {
                    parts[1..].to_vec()
                } else if let Some(ref img) = image {
                    vec![img.path.clone()]
                } else {
                    println!("Usage: summary <path> [path...]");
                    continue;
                };
                for (path, outcome) in summary::summarize_files(&paths) {
                    println!("{}: {}", path.display(), outcome.report_line());
                }
            }
            "verify" => {
                if let Some(ref img) = image {
                    verify_round_trip(img);
                } else {
                    println!("No image loaded.");
                }
            }
            "save" => {
                if let Some(ref img) = image {
                    if parts.len() < 2 {
                        println!("Usage: save <path>");
                        continue;
                    }
                    match img.disk.save(&parts[1]) {
                        Ok(_) => println!("Saved to: {}", parts[1]),
                        Err(e) => println!("Error: {}", e),
                    }
                } else {
                    println!("No image loaded.");
                }
            }
            _ => {
                println!("Unknown command: {}. Type 'help' for available commands.", command);
            }
        }
    }
}

/// Split a command line on whitespace, honouring double quotes
fn parse_command_line(input: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in input.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
            }
            ' ' | '\t' if !in_quotes => {
                if !current.is_empty() {
                    parts.push(std::mem::take(&mut current));
                }
            }
            _ => {
                current.push(ch);
            }
        }
    }

    if !current.is_empty() {
        parts.push(current);
    }

    parts
}

fn print_help() {
    println!("Available commands:");
    println!("  open <path>                    - Open an IMD image (use quotes for paths with spaces)");
    println!("  info                           - Show header and image statistics");
    println!("  tracks                         - List all tracks");
    println!("  sectors [track_index]          - List sector records (all or one track)");
    println!("  read-sector <track_index> <n>  - Hex dump a sector by logical number");
    println!("  map [head]                     - Visual sector map (white=ok, red=error, yellow=deleted)");
    println!("  summary [path...]              - Track/mode/error summary for one or more images");
    println!("  verify                         - Check that re-encoding reproduces the file exactly");
    println!("  save <path>                    - Save image to file");
    println!("  help                           - Show this help");
    println!("  quit, exit                     - Exit");
}

fn print_info(image: &OpenImage) {
    let disk = &image.disk;
    let summary = DiskSummary::from_disk(disk);

    println!("Filename: {}", image.path);
    println!("Version: {}", disk.version());
    println!("Created: {} {}", disk.date(), disk.time());
    if !disk.comment().is_empty() {
        println!("Comment: {}", disk.comment_text().trim_end());
    }
    println!("Tracks: {}", summary.track_count);
    println!("Heads: {}", disk.head_count());
    println!("Modes: {}", summary.mode_names().join(", "));
    println!("Sectors: {}", disk.sector_count());
    println!("Error sectors: {}", summary.error_count);
    println!("Total capacity: {} KB", disk.total_capacity() / 1024);
    println!("Image size: {} bytes", disk.size());
}

fn list_tracks(disk: &Disk) {
    println!(
        "{:<6} {:<4} {:<4} {:<12} {:<8} {:<6} {:<5} {:<7} {:<6} {:<6}",
        "Index", "Cyl", "Head", "Mode", "Sectors", "Size", "Maps", "Errors", "Del", "Comp"
    );
    println!("{}", "-".repeat(72));

    for (index, track) in disk.tracks().iter().enumerate() {
        let maps = format!(
            "{}{}",
            if track.sector_cylinder_map().is_some() { "C" } else { "-" },
            if track.sector_head_map().is_some() { "H" } else { "-" }
        );
        println!(
            "{:<6} {:<4} {:<4} {:<12} {:<8} {:<6} {:<5} {:<7} {:<6} {:<6}",
            index,
            track.cylinder(),
            track.head(),
            track.mode().name(),
            track.sector_count(),
            track.sector_size().bytes(),
            maps,
            track.error_count(),
            track.deleted_count(),
            track.compressed_count()
        );
    }
}

fn list_sectors_on_track(disk: &Disk, index: usize) {
    let Some(track) = disk.tracks().get(index) else {
        println!("Track {} not found.", index);
        return;
    };

    println!(
        "Track {} (C{} H{}, {}, {} bytes/sector):",
        index,
        track.cylinder(),
        track.head(),
        track.mode(),
        track.sector_size()
    );
    println!(
        "{:<6} {:<6} {:<6} {:<6} {:<6} {:<28}",
        "Pos", "Sector", "Cyl", "Head", "Type", "Status"
    );
    println!("{}", "-".repeat(60));

    for (pos, record) in track.sector_data_records().iter().enumerate() {
        println!(
            "{:<6} {:<6} {:<6} {:<6} {:<6} {:<28}",
            pos,
            track.sector_numbering_map()[pos],
            track.sector_cylinder(pos).unwrap_or(track.cylinder()),
            track.sector_head(pos).unwrap_or(track.head()),
            record.record_type().code(),
            record.record_type()
        );
    }
    println!();
}

fn verify_round_trip(image: &OpenImage) {
    let original = match std::fs::read(&image.path) {
        Ok(bytes) => bytes,
        Err(e) => {
            println!("Error: {}", e);
            return;
        }
    };
    let encoded = image.disk.to_bytes();

    if encoded == original {
        println!("OK: {} bytes re-encoded identically.", encoded.len());
        return;
    }

    let first_diff = encoded
        .iter()
        .zip(original.iter())
        .position(|(a, b)| a != b)
        .unwrap_or(encoded.len().min(original.len()));
    println!(
        "MISMATCH: re-encoded {} bytes, original {} bytes, first difference at offset {:#X}",
        encoded.len(),
        original.len(),
        first_diff
    );
}

fn print_hex_dump(data: &[u8], max_bytes: usize) {
    let len = data.len().min(max_bytes);

    for (i, chunk) in data[..len].chunks(16).enumerate() {
        print!("{:04X}: ", i * 16);

        for (j, byte) in chunk.iter().enumerate() {
            print!("{:02X} ", byte);
            if j == 7 {
                print!(" ");
            }
        }

        // Pad if less than 16 bytes
        for j in chunk.len()..16 {
            print!("   ");
            if j == 7 {
                print!(" ");
            }
        }

        print!(" |");

        for byte in chunk {
            let c = if *byte >= 32 && *byte < 127 {
                *byte as char
            } else {
                '.'
            };
            print!("{}", c);
        }

        println!("|");
    }

    if data.len() > max_bytes {
        println!("... ({} more bytes)", data.len() - max_bytes);
    }
}

fn parse_hex_or_dec(s: &str) -> Option<u8> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u8::from_str_radix(hex, 16).ok()
    } else {
        s.parse().ok()
    }
}
