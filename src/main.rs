use std::fs::File;
use std::io::Write;
use std::process::ExitCode;

use clap::{arg, crate_version, Command};

mod cli;
use cli::naming;
use cli::prompt::confirm;

use egz::{compress, expand, Error, STD_OPTIONS};

const RCH: &str = "unreachable was reached";

fn main() -> ExitCode {
    let long_help = "Examples:
---------
Compress:  `egz compress my_file`           -> writes `my_file.egz`
Expand:    `egz expand my_file.egz`         -> writes `my_file`
Force:     `egz compress --force tiny_file` -> skip the negative-compression check";

    let main_cmd = Command::new("egz")
        .about("byte-granular Huffman compression with a self-describing container")
        .after_long_help(long_help)
        .version(crate_version!())
        .arg(arg!(-d --debug "enable verbose logging").global(true))
        .subcommand(
            Command::new("compress")
                .about("compress a file into a .egz container")
                .arg(arg!(<PATH> "input file path"))
                .arg(arg!(-f --force "write the container even if it would not be smaller")),
        )
        .subcommand(
            Command::new("expand")
                .about("expand a .egz container")
                .arg(arg!(<PATH> "input file path")),
        );

    let matches = main_cmd.get_matches();

    let debug = matches.get_flag("debug");
    env_logger::Builder::new()
        .filter_level(if debug { log::LevelFilter::Debug } else { log::LevelFilter::Info })
        .init();

    let result = if let Some(cmd) = matches.subcommand_matches("compress") {
        run_compress(cmd)
    } else if let Some(cmd) = matches.subcommand_matches("expand") {
        run_expand(cmd)
    } else {
        eprintln!("no subcommand given, try --help");
        return ExitCode::FAILURE;
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run_compress(cmd: &clap::ArgMatches) -> Result<(), Error> {
    let path_in = cmd.get_one::<String>("PATH").expect(RCH);
    let force = cmd.get_flag("force");

    let mut in_file = File::open(path_in).map_err(|_| Error::FileFormatMismatch)?;
    let options = egz::Options { force, ..STD_OPTIONS };

    let out_path = naming::compress_output_path(path_in, |candidate| {
        std::path::Path::new(candidate).exists() && !confirm(&format!("{candidate} exists, overwrite?"))
    });
    let Some(out_path) = out_path else {
        return Err(Error::UserAbort);
    };

    let mut out_file = File::create(&out_path).map_err(|_| Error::FileFormatMismatch)?;
    let (in_size, out_size) = compress(&mut in_file, &mut out_file, &options)?;
    log::info!("compressed {in_size} bytes into {out_size} bytes ({out_path})");
    Ok(())
}

fn run_expand(cmd: &clap::ArgMatches) -> Result<(), Error> {
    let path_in = cmd.get_one::<String>("PATH").expect(RCH);

    let mut in_file = File::open(path_in).map_err(|_| Error::FileFormatMismatch)?;
    let out_path = naming::expand_output_path(path_in, |candidate| std::path::Path::new(candidate).exists());
    let mut out_file = File::create(&out_path).map_err(|_| Error::FileFormatMismatch)?;

    match expand(&mut in_file, &mut out_file) {
        Ok((in_size, out_size)) => {
            log::info!("expanded {in_size} bytes into {out_size} bytes ({out_path})");
            Ok(())
        }
        Err(err) => {
            // the destination has already been written by the time a
            // digest mismatch can be detected; leave it on disk and
            // report the failure rather than silently deleting it.
            let _ = out_file.flush();
            Err(err)
        }
    }
}
