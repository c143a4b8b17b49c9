use std::{env, iter::Peekable, path::PathBuf, str::Chars};

use nix::unistd::{getuid, User};

use crate::error::{PathError, PathResult};

pub trait PathResolver {
    /// Resolves a path string that may contain environment variables.
    ///
    /// Expands `$VAR` and `${VAR}`, replaces a leading `~` with the user's home
    /// directory and anchors relative paths at the current working directory.
    ///
    /// # Errors
    ///
    /// * [`PathError::Empty`] if the path is empty
    /// * [`PathError::CurrentDir`] if the current directory cannot be determined
    /// * [`PathError::MissingEnvVar`] if a referenced variable is undefined
    /// * [`PathError::UnclosedVariable`] if a `${` is never closed
    ///
    /// # Example
    ///
    /// ```
    /// use rpool_utils::error::PathResult;
    /// use rpool_utils::path::{PathResolver, SystemPathResolver};
    ///
    /// fn main() -> PathResult<()> {
    ///     let resolved = SystemPathResolver.resolve_path("$HOME/repos/current")?;
    ///     assert!(resolved.is_absolute());
    ///     Ok(())
    /// }
    /// ```
    fn resolve_path(&self, path: &str) -> PathResult<PathBuf>;

    /// Returns the user's home directory.
    ///
    /// `HOME` wins when set; otherwise the passwd entry of the current uid is
    /// consulted, and `/` is used as a last resort.
    fn home_dir(&self) -> PathBuf;

    /// `$XDG_CONFIG_HOME`, defaulting to `$HOME/.config`.
    fn xdg_config_home(&self) -> PathBuf;

    /// `$XDG_DATA_HOME`, defaulting to `$HOME/.local/share`.
    fn xdg_data_home(&self) -> PathBuf;

    /// `$XDG_CACHE_HOME`, defaulting to `$HOME/.cache`.
    fn xdg_cache_home(&self) -> PathBuf;
}

/// The default [`PathResolver`] backed by the process environment.
pub struct SystemPathResolver;

impl PathResolver for SystemPathResolver {
    fn resolve_path(&self, path: &str) -> PathResult<PathBuf> {
        let path = path.trim();

        if path.is_empty() {
            return Err(PathError::Empty);
        }

        let path_buf = PathBuf::from(self.expand_variables(path)?);

        if path_buf.is_absolute() {
            Ok(path_buf)
        } else {
            env::current_dir()
                .map(|cwd| cwd.join(path_buf))
                .map_err(|err| PathError::CurrentDir { source: err })
        }
    }

    fn home_dir(&self) -> PathBuf {
        if let Ok(home) = env::var("HOME") {
            return PathBuf::from(home);
        }

        match User::from_uid(getuid()) {
            Ok(Some(user)) => user.dir,
            _ => PathBuf::from("/"),
        }
    }

    fn xdg_config_home(&self) -> PathBuf {
        env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| self.home_dir().join(".config"))
    }

    fn xdg_data_home(&self) -> PathBuf {
        env::var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| self.home_dir().join(".local/share"))
    }

    fn xdg_cache_home(&self) -> PathBuf {
        env::var("XDG_CACHE_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| self.home_dir().join(".cache"))
    }
}

impl SystemPathResolver {
    fn expand_variables(&self, path: &str) -> PathResult<String> {
        let mut result = String::with_capacity(path.len());
        let mut chars = path.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '$' if chars.peek() == Some(&'{') => {
                    chars.next();
                    let var_name = Self::consume_braced(&mut chars)?;
                    self.push_env_var(&var_name, &mut result, path)?;
                }
                '$' => {
                    let var_name = Self::consume_var_name(&mut chars);
                    if var_name.is_empty() {
                        result.push('$');
                    } else {
                        self.push_env_var(&var_name, &mut result, path)?;
                    }
                }
                '~' if result.is_empty() => result.push_str(&self.home_dir().to_string_lossy()),
                _ => result.push(c),
            }
        }

        Ok(result)
    }

    fn consume_braced(chars: &mut Peekable<Chars>) -> PathResult<String> {
        let mut var_name = String::new();

        for c in chars.by_ref() {
            if c == '}' {
                return Ok(var_name);
            }
            var_name.push(c);
        }

        Err(PathError::UnclosedVariable {
            input: format!("${{{var_name}"),
        })
    }

    fn consume_var_name(chars: &mut Peekable<Chars>) -> String {
        let mut var_name = String::new();

        while let Some(&c) = chars.peek() {
            if !(c.is_alphanumeric() || c == '_') {
                break;
            }
            var_name.push(c);
            chars.next();
        }

        var_name
    }

    fn push_env_var(&self, var_name: &str, result: &mut String, original: &str) -> PathResult<()> {
        let value = match var_name {
            "HOME" => self.home_dir(),
            "XDG_CONFIG_HOME" => self.xdg_config_home(),
            "XDG_DATA_HOME" => self.xdg_data_home(),
            "XDG_CACHE_HOME" => self.xdg_cache_home(),
            _ => {
                let value = env::var(var_name).map_err(|_| {
                    PathError::MissingEnvVar {
                        var: var_name.into(),
                        input: original.into(),
                    }
                })?;
                PathBuf::from(value)
            }
        };
        result.push_str(&value.to_string_lossy());
        Ok(())
    }
}

/// Resolves a path string using [`SystemPathResolver`].
///
/// See [`PathResolver::resolve_path`] for details.
pub fn resolve_path(path: &str) -> PathResult<PathBuf> {
    SystemPathResolver.resolve_path(path)
}

pub fn home_dir() -> PathBuf {
    SystemPathResolver.home_dir()
}

pub fn xdg_config_home() -> PathBuf {
    SystemPathResolver.xdg_config_home()
}

pub fn xdg_data_home() -> PathBuf {
    SystemPathResolver.xdg_data_home()
}

pub fn xdg_cache_home() -> PathBuf {
    SystemPathResolver.xdg_cache_home()
}
