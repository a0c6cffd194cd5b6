//! Reading settings from environment variables.

use std::{env, str::FromStr, fmt::Display};

use anyhow::{anyhow, bail, Result};

/// `Ok(None)` if the variable is not set, an error if it is set but
/// can't be decoded or parsed.
pub fn opt_get_env<T: FromStr>(varname: &str) -> Result<Option<T>>
    where T::Err: Display
{
    match env::var(varname) {
        Ok(s) => {
            Ok(Some(s.parse().map_err(
                |e| anyhow!("could not parse {varname:?} env var with contents {s:?}: {e}"))?))
        },
        Err(e) => match e {
            env::VarError::NotPresent => Ok(None),
            env::VarError::NotUnicode(_) => bail!("could not decode {varname:?} env var: {e}")
        }
    }
}

pub fn get_env_bool(varname: &str) -> Result<bool> {
    Ok(opt_get_env(varname)?.unwrap_or(false))
}

pub fn getenv_or(varname: &str, default: &str) -> Result<String> {
    Ok(opt_get_env(varname)?.unwrap_or_else(|| default.to_string()))
}
