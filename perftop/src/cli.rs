//! Command-line parsing.

use std::num::NonZeroU32;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub base_url: Option<String>,
    pub profile: Option<String>,
    pub save: bool,
    pub hours: Option<NonZeroU32>,
    pub timeout_secs: Option<u64>,
    pub no_auto_refresh: bool,
    pub dry_run: bool,
}

pub fn usage(prog: &str) -> String {
    format!(
        "Usage: {prog} [--profile NAME|-P NAME] [--save] [--hours N] [--timeout SECS] [--no-auto-refresh] [--dry-run] [http://HOST:PORT/api]\n\
         \n\
         Environment: PERFTOP_API_URL (base URL), PERFTOP_TIMEOUT_SECS, PERFTOP_LOG (log filter)\n\
         Keys: r refresh now, a toggle auto-refresh, q quit"
    )
}

/// `Err` carries the text to print: usage for `--help`, or a usage error.
pub fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<CliArgs, String> {
    let mut it = args.into_iter();
    let prog = it.next().unwrap_or_else(|| "perftop".into());
    let mut out = CliArgs::default();

    while let Some(arg) = it.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((f, v)) if f.starts_with("--") => (f.to_string(), Some(v.to_string())),
            _ => (arg.clone(), None),
        };
        let mut value = |name: &str| -> Result<String, String> {
            inline
                .clone()
                .or_else(|| it.next())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| format!("{name} needs a value\n{}", usage(&prog)))
        };
        match flag.as_str() {
            "-h" | "--help" => return Err(usage(&prog)),
            "--profile" | "-P" => out.profile = Some(value("--profile")?),
            "--save" => out.save = true,
            "--no-auto-refresh" => out.no_auto_refresh = true,
            "--dry-run" => out.dry_run = true,
            "--hours" => {
                let v = value("--hours")?;
                let h = v
                    .parse::<NonZeroU32>()
                    .map_err(|_| format!("--hours must be a positive integer, got {v:?}"))?;
                out.hours = Some(h);
            }
            "--timeout" => {
                let v = value("--timeout")?;
                let secs = v
                    .parse::<u64>()
                    .ok()
                    .filter(|s| *s > 0)
                    .ok_or_else(|| format!("--timeout must be a positive number of seconds, got {v:?}"))?;
                out.timeout_secs = Some(secs);
            }
            _ if flag.starts_with('-') => {
                return Err(format!("Unknown option {flag}\n{}", usage(&prog)));
            }
            _ => {
                if out.base_url.is_some() {
                    return Err(format!("Unexpected argument. {}", usage(&prog)));
                }
                out.base_url = Some(arg);
            }
        }
    }
    Ok(out)
}
