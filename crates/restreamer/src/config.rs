//! Turns the config file, the active profile and the global flags into a
//! ready `RestreamerClient`.
//!
//! Flags win over the profile; the profile wins over `[defaults]`.

use secrecy::SecretString;

use restreamer_api::{Connection, RestreamerClient};
use restreamer_config::{Config, Profile};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use restreamer_config::{config_path, load_config_or_default};

/// Where a client points, kept for error messages.
#[derive(Debug, Clone)]
pub struct Target {
    pub profile: String,
    pub url: String,
}

/// Profile name selected by `--profile`, else the config's default.
pub fn active_profile_name(global: &GlobalOpts, cfg: &Config) -> String {
    cfg.profile_name(global.profile.as_deref()).to_owned()
}

/// Merge the named profile (if any) with flag overrides.
fn effective_profile(global: &GlobalOpts, cfg: &Config, name: &str) -> Result<Profile, CliError> {
    let mut profile = match (cfg.profiles.get(name), &global.url) {
        (Some(profile), _) => profile.clone(),
        (None, Some(_)) => Profile::default(),
        (None, None) if global.profile.is_some() => {
            let mut available: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
            available.sort_unstable();
            return Err(CliError::ProfileNotFound {
                name: name.to_owned(),
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            });
        }
        (None, None) => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    if let Some(url) = &global.url {
        profile.url.clone_from(url);
    }
    if let Some(username) = &global.username {
        profile.username = Some(username.clone());
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
    Ok(profile)
}

fn connection_for(
    global: &GlobalOpts,
    profile: &Profile,
    name: &str,
) -> Result<Connection, CliError> {
    // An explicit --password bypasses env/keyring/plaintext lookup.
    match (&global.password, profile.username.as_deref()) {
        (Some(password), Some(username)) if !username.is_empty() => {
            let connection =
                Connection::from_url(&profile.url).map_err(|e| CliError::Validation {
                    field: "url".into(),
                    reason: e.to_string(),
                })?;
            Ok(connection.with_credentials(username, SecretString::from(password.clone())))
        }
        (Some(_), _) => Err(CliError::Validation {
            field: "password".into(),
            reason: "--password needs a username (--username or profile)".into(),
        }),
        (None, _) => Ok(restreamer_config::profile_to_connection(profile, name)?),
    }
}

/// Build a client for the active profile and flags.
pub fn resolve_client(global: &GlobalOpts) -> Result<(RestreamerClient, Target), CliError> {
    let cfg = load_config_or_default();
    let name = active_profile_name(global, &cfg);
    let profile = effective_profile(global, &cfg, &name)?;

    let target = Target {
        profile: name.clone(),
        url: profile.url.clone(),
    };

    let connection = connection_for(global, &profile, &name)?;
    let client_config = restreamer_config::profile_to_client_config(&profile, &cfg.defaults);
    tracing::debug!(profile = %name, url = %profile.url, "resolved daemon target");

    let client = RestreamerClient::with_config(connection, &client_config)
        .map_err(|e| CliError::from(e).with_context(&target.url, &target.profile))?;
    Ok((client, target))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["restreamer"];
        argv.extend_from_slice(args);
        argv.push("ping");
        Cli::try_parse_from(argv).unwrap().global
    }

    fn config_with(name: &str, profile: Profile) -> Config {
        let mut cfg = Config::default();
        cfg.profiles.insert(name.into(), profile);
        cfg
    }

    #[test]
    fn flags_override_profile() {
        let cfg = config_with(
            "default",
            Profile {
                url: "http://studio:8080".into(),
                username: Some("admin".into()),
                timeout: Some(5),
                ..Profile::default()
            },
        );
        let g = global(&["--url", "https://edge:8443", "--timeout", "30", "-k"]);
        let profile = effective_profile(&g, &cfg, "default").unwrap();
        assert_eq!(profile.url, "https://edge:8443");
        assert_eq!(profile.username.as_deref(), Some("admin"));
        assert_eq!(profile.timeout, Some(30));
        assert_eq!(profile.insecure, Some(true));
    }

    #[test]
    fn url_flag_works_without_profile() {
        let g = global(&["--url", "http://localhost:8080"]);
        let profile = effective_profile(&g, &Config::default(), "default").unwrap();
        assert_eq!(profile.url, "http://localhost:8080");
        assert!(profile.username.is_none());
    }

    #[test]
    fn unknown_explicit_profile_lists_available() {
        let cfg = config_with("studio", Profile::default());
        let g = global(&["--profile", "edge"]);
        let err = effective_profile(&g, &cfg, "edge").unwrap_err();
        assert!(
            matches!(err, CliError::ProfileNotFound { ref available, .. } if available == "studio")
        );
    }

    #[test]
    fn password_flag_needs_username() {
        let g = global(&["--password", "secret"]);
        let profile = Profile {
            url: "http://localhost:8080".into(),
            ..Profile::default()
        };
        let err = connection_for(&g, &profile, "default").unwrap_err();
        assert!(matches!(err, CliError::Validation { ref field, .. } if field == "password"));
    }

    #[test]
    fn password_flag_sets_credentials() {
        let g = global(&["--password", "secret"]);
        let profile = Profile {
            url: "http://localhost:8080".into(),
            username: Some("admin".into()),
            ..Profile::default()
        };
        let connection = connection_for(&g, &profile, "default").unwrap();
        assert!(connection.has_credentials());
        assert_eq!(connection.port, 8080);
    }
}
