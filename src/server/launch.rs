//! Command line of the Java CoreNLP server.

use crate::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::warn;

pub const SERVER_MAIN_CLASS: &str = "edu.stanford.nlp.pipeline.StanfordCoreNLPServer";

/// Boolean switches passed through as `-<flag>`.
pub const SERVER_FLAGS: [&str; 2] = ["ssl", "strict"];

/// Valued options passed through as `-<name> <value>`.
pub const SERVER_OPTIONS: [&str; 7] = [
    "status_port",
    "uriContext",
    "key",
    "username",
    "password",
    "blacklist",
    "server_id",
];

/// Resolves where the CoreNLP jars live.
///
/// `$CLASSPATH` (or `%CLASSPATH%`) reads the `CLASSPATH` variable, an empty
/// value falls back to `CORENLP_HOME`, anything else is used as given.
pub fn resolve_classpath<F>(configured: &str, env: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let upper = configured.to_uppercase();
    let resolved = if upper == "$CLASSPATH" || upper == "%CLASSPATH%" {
        env("CLASSPATH")
    } else if configured.is_empty() {
        env("CORENLP_HOME")
    } else {
        Some(configured.to_string())
    };

    resolved
        .filter(|cp| !cp.is_empty())
        .ok_or_else(|| {
            Error::config("Classpath used to locate the CoreNLP server is undefined; set CORENLP_HOME or pass a classpath")
        })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSettings<'a> {
    pub memory: &'a str,
    pub classpath: &'a str,
    pub port: u16,
    pub timeout_ms: u64,
    pub threads: usize,
    pub max_char_length: usize,
    pub quiet: bool,
    pub server_properties: Option<&'a Path>,
    pub preload: Option<&'a str>,
    pub flags: &'a [String],
    pub options: &'a BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerLaunch {
    pub program: String,
    pub args: Vec<String>,
    pub quiet: bool,
}

impl ServerLaunch {
    pub fn java(settings: &LaunchSettings<'_>) -> Self {
        let classpath = format!(
            "{}{}*",
            settings.classpath.trim_end_matches(['/', '\\']),
            std::path::MAIN_SEPARATOR
        );

        let mut args = vec![
            format!("-Xmx{}", settings.memory),
            "-cp".to_string(),
            classpath,
            SERVER_MAIN_CLASS.to_string(),
            "-port".to_string(),
            settings.port.to_string(),
            "-timeout".to_string(),
            settings.timeout_ms.to_string(),
            "-threads".to_string(),
            settings.threads.to_string(),
            "-maxCharLength".to_string(),
            settings.max_char_length.to_string(),
            "-quiet".to_string(),
            settings.quiet.to_string(),
        ];

        if let Some(path) = settings.server_properties {
            args.push("-serverProperties".to_string());
            args.push(path.display().to_string());
        }

        if let Some(annotators) = settings.preload.filter(|a| !a.is_empty()) {
            args.push("-preload".to_string());
            args.push(annotators.to_string());
        }

        for flag in SERVER_FLAGS {
            if settings.flags.iter().any(|f| f == flag) {
                args.push(format!("-{}", flag));
            }
        }
        for flag in settings.flags {
            if !SERVER_FLAGS.contains(&flag.as_str()) {
                warn!("Ignoring unknown server flag: {}", flag);
            }
        }

        for name in SERVER_OPTIONS {
            if let Some(value) = settings.options.get(name) {
                args.push(format!("-{}", name));
                args.push(value.clone());
            }
        }
        for name in settings.options.keys() {
            if !SERVER_OPTIONS.contains(&name.as_str()) {
                warn!("Ignoring unknown server option: {}", name);
            }
        }

        Self {
            program: "java".to_string(),
            args,
            quiet: settings.quiet,
        }
    }

    pub fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args).kill_on_drop(true);
        if self.quiet {
            command.stdout(Stdio::null()).stderr(Stdio::null());
        }
        command
    }
}

impl fmt::Display for ServerLaunch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings<'a>(
        flags: &'a [String],
        options: &'a BTreeMap<String, String>,
        props: Option<&'a Path>,
    ) -> LaunchSettings<'a> {
        LaunchSettings {
            memory: "8G",
            classpath: "/opt/corenlp/",
            port: 9000,
            timeout_ms: 30000,
            threads: 5,
            max_char_length: 100000,
            quiet: false,
            server_properties: props,
            preload: Some("tokenize,ssplit,pos"),
            flags,
            options,
        }
    }

    #[test]
    fn test_java_command_line() {
        let options = BTreeMap::new();
        let props = Path::new("/tmp/corenlp_server-0123456789abcdef.props");
        let launch = ServerLaunch::java(&settings(&[], &options, Some(props)));

        assert_eq!(launch.program, "java");
        let expected_cp = format!("/opt/corenlp{}*", std::path::MAIN_SEPARATOR);
        assert_eq!(
            launch.args,
            vec![
                "-Xmx8G",
                "-cp",
                expected_cp.as_str(),
                SERVER_MAIN_CLASS,
                "-port",
                "9000",
                "-timeout",
                "30000",
                "-threads",
                "5",
                "-maxCharLength",
                "100000",
                "-quiet",
                "false",
                "-serverProperties",
                "/tmp/corenlp_server-0123456789abcdef.props",
                "-preload",
                "tokenize,ssplit,pos",
            ]
        );
    }

    #[test]
    fn test_flags_and_options_are_filtered() {
        let flags = vec!["strict".to_string(), "bogus".to_string(), "ssl".to_string()];
        let options: BTreeMap<String, String> = [
            ("username", "user"),
            ("password", "secret"),
            ("colour", "blue"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let launch = ServerLaunch::java(&settings(&flags, &options, None));
        let tail: Vec<&str> = launch.args[14..].iter().map(String::as_str).collect();
        assert_eq!(
            tail,
            vec!["-preload", "tokenize,ssplit,pos", "-ssl", "-strict", "-username", "user", "-password", "secret"]
        );
        assert!(!launch.to_string().contains("colour"));
    }

    #[test]
    fn test_resolve_classpath() {
        let env = |name: &str| match name {
            "CLASSPATH" => Some("/from/classpath".to_string()),
            "CORENLP_HOME" => Some("/from/home".to_string()),
            _ => None,
        };
        assert_eq!(resolve_classpath("$CLASSPATH", env).unwrap(), "/from/classpath");
        assert_eq!(resolve_classpath("%classpath%", env).unwrap(), "/from/classpath");
        assert_eq!(resolve_classpath("", env).unwrap(), "/from/home");
        assert_eq!(resolve_classpath("/explicit", env).unwrap(), "/explicit");
        assert!(matches!(resolve_classpath("", |_| None), Err(Error::Config(_))));
    }
}
