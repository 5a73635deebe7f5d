//! Interactive stdin confirmation, grounded on
//! `original_source/source/compress.c`'s `egz_check_compression_ratio`
//! and `expand.c`'s `egz_verify_checksum` (both read a single answer
//! character and treat `y`/`Y` as acceptance).

use std::io::{self, Write};

/// Prints `message` followed by ` [y/N] `, reads a line from stdin, and
/// returns whether it starts with `y` or `Y`. Any I/O error or EOF is
/// treated as a decline.
pub fn confirm(message: &str) -> bool {
    print!("{message} [y/N] ");
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    match io::stdin().read_line(&mut answer) {
        Ok(_) => matches!(answer.trim().chars().next(), Some('y' | 'Y')),
        Err(_) => false,
    }
}
