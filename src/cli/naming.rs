//! Output filename derivation, per `spec.md` §6's description of the CLI
//! surface: compress appends `.egz`; expand strips it (or falls back to
//! an `.out` suffix when the input doesn't carry one). Neither the
//! original `egz` tool nor the teacher's CLI derives output paths (both
//! take explicit `-o`), so this is new code in the teacher's module
//! style rather than a direct port.

const SUFFIX: &str = ".egz";

/// Compute the output path for a compress run. `exists_and_should_skip`
/// is asked, for each candidate path in turn, whether that candidate is
/// taken and the user declined to overwrite it; on a decline the
/// function tries the next `-<N>` suffixed candidate. Returns `None` if
/// the caller aborts (used to surface `Error::UserAbort`).
pub fn compress_output_path(input: &str, mut exists_and_should_skip: impl FnMut(&str) -> bool) -> Option<String> {
    let base = format!("{input}{SUFFIX}");
    if !exists_and_should_skip(&base) {
        return Some(base);
    }
    for n in 1..=9999u32 {
        let candidate = format!("{input}-{n}{SUFFIX}");
        if !exists_and_should_skip(&candidate) {
            return Some(candidate);
        }
    }
    None
}

/// Compute the output path for an expand run. Unlike compress, expand
/// never prompts: on a collision it silently tries the next `-<N>`
/// suffix so a batch `expand` never blocks on stdin.
pub fn expand_output_path(input: &str, mut exists: impl FnMut(&str) -> bool) -> String {
    let base = match input.strip_suffix(SUFFIX) {
        Some(stem) => stem.to_string(),
        None => format!("{input}.out"),
    };
    if !exists(&base) {
        return base;
    }
    for n in 1.. {
        let candidate = format!("{base}-{n}");
        if !exists(&candidate) {
            return candidate;
        }
    }
    unreachable!("u32 suffix space exhausted")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compress_path_appends_suffix() {
        let path = compress_output_path("report.txt", |_| false).unwrap();
        assert_eq!(path, "report.txt.egz");
    }

    #[test]
    fn compress_path_suffixes_on_collision() {
        let mut seen = vec!["report.txt.egz".to_string()];
        let path = compress_output_path("report.txt", |candidate| {
            if seen.contains(&candidate.to_string()) {
                true
            } else {
                seen.push(candidate.to_string());
                false
            }
        })
        .unwrap();
        assert_eq!(path, "report.txt-1.egz");
    }

    #[test]
    fn compress_path_returns_none_when_every_candidate_declined() {
        assert!(compress_output_path("report.txt", |_| true).is_none());
    }

    #[test]
    fn expand_path_strips_suffix() {
        let path = expand_output_path("report.txt.egz", |_| false);
        assert_eq!(path, "report.txt");
    }

    #[test]
    fn expand_path_falls_back_to_out_suffix_without_egz_extension() {
        let path = expand_output_path("mystery_blob", |_| false);
        assert_eq!(path, "mystery_blob.out");
    }

    #[test]
    fn expand_path_suffixes_on_collision_without_prompting() {
        let mut taken = vec!["report.txt".to_string(), "report.txt-1".to_string()];
        let path = expand_output_path("report.txt.egz", |candidate| taken.contains(&candidate.to_string()));
        assert_eq!(path, "report.txt-2");
        taken.push(path);
        assert_eq!(taken.len(), 3);
    }
}
