use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap_complete::{generate, Shell};

use crate::board::BoardError;

const BIN_NAME: &str = "opsboard";

pub fn generate_completions(shell: Shell, buf: &mut dyn Write) {
    let mut cmd = crate::cli::styled_command();
    generate(shell, &mut cmd, BIN_NAME, buf);
}

fn shell_from_path(shell_var: &str) -> Option<Shell> {
    let basename = shell_var.rsplit('/').next()?;
    parse_shell(basename)
}

pub fn detect_current_shell() -> Option<Shell> {
    let shell_var = std::env::var("SHELL").ok()?;
    shell_from_path(&shell_var)
}

fn completions_install_path_for_home(shell: Shell, home: &Path) -> Option<PathBuf> {
    match shell {
        Shell::Bash => Some(
            home.join(".local/share/bash-completion/completions")
                .join(BIN_NAME),
        ),
        Shell::Zsh => Some(
            home.join(".config/opsboard/completions")
                .join(format!("{BIN_NAME}.zsh")),
        ),
        Shell::Fish => Some(
            home.join(".config/fish/completions")
                .join(format!("{BIN_NAME}.fish")),
        ),
        _ => None,
    }
}

fn install_completions_at(shell: Shell, home: &Path) -> io::Result<PathBuf> {
    let path = completions_install_path_for_home(shell, home).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::Unsupported,
            format!("no install path for {shell:?}"),
        )
    })?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut buf = Vec::new();
    generate_completions(shell, &mut buf);
    std::fs::write(&path, buf)?;

    if shell == Shell::Zsh {
        patch_zshrc(home, &path)?;
    }

    Ok(path)
}

pub fn install_completions(shell: Shell) -> io::Result<PathBuf> {
    let home = std::env::var("HOME").map_err(|e| io::Error::new(io::ErrorKind::NotFound, e))?;
    install_completions_at(shell, Path::new(&home))
}

fn patch_zshrc(home: &Path, completions_path: &Path) -> io::Result<()> {
    let zshrc = home.join(".zshrc");
    let source_line = format!("source \"{}\"", completions_path.display());

    if zshrc.exists() {
        let content = std::fs::read_to_string(&zshrc)?;
        if content.contains(&source_line) {
            return Ok(());
        }
    }

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&zshrc)?;
    writeln!(file)?;
    writeln!(file, "# {BIN_NAME} shell completions")?;
    writeln!(file, "{source_line}")?;
    Ok(())
}

fn parse_shell(raw: &str) -> Option<Shell> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "bash" => Some(Shell::Bash),
        "zsh" => Some(Shell::Zsh),
        "fish" => Some(Shell::Fish),
        "elvish" => Some(Shell::Elvish),
        "powershell" | "pwsh" => Some(Shell::PowerShell),
        _ => None,
    }
}

pub fn run_completions_command(shell_arg: Option<&str>, install: bool) -> Result<(), BoardError> {
    let shell = match shell_arg {
        Some(name) => parse_shell(name)
            .ok_or_else(|| BoardError::InvalidArgument(format!("unknown shell '{name}'")))?,
        None => detect_current_shell().ok_or_else(|| {
            BoardError::InvalidArgument(
                "unable to detect shell from $SHELL; pass a shell name".to_string(),
            )
        })?,
    };

    if install {
        let path = install_completions(shell)?;
        println!("completions installed to {}", path.display());
    } else {
        let mut stdout = io::stdout().lock();
        generate_completions(shell, &mut stdout);
    }
    Ok(())
}
