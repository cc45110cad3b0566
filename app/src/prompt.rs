use std::{
    collections::BTreeSet,
    io::{self, BufRead, Write},
};

use nocdc_db::InstallPrompt;

/// Asks a yes/no question on stdout and reads the answer from stdin.
/// Anything but `y`/`yes` (including end of input) counts as no.
pub fn confirm(question: &str) -> bool {
    print!("{question} [y/N] ");
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) => is_yes(&answer),
        Err(err) => {
            tracing::debug!("failed to read confirmation: {err}");
            false
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

pub struct StdinPrompt {
    pub assume_yes: bool,
}

impl InstallPrompt for StdinPrompt {
    fn confirm_install(&self, missing: &BTreeSet<String>) -> bool {
        let packages = missing.iter().cloned().collect::<Vec<_>>().join(", ");
        println!("The following packages are required but not installed: {packages}");
        if self.assume_yes {
            return true;
        }
        confirm("Do you want to install them?")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_explicit_yes_confirms() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("n\n"));
        assert!(!is_yes("yep"));
    }

    #[test]
    fn assume_yes_skips_the_question() {
        let prompt = StdinPrompt { assume_yes: true };
        let missing = BTreeSet::from(["oracle".to_string()]);
        assert!(prompt.confirm_install(&missing));
    }
}
