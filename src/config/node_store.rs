use super::{ConfigLoadError, ConfigNode};
use std::path::{Path, PathBuf};

/// Persistence backend of the configuration document.
pub trait NodeStore: Send + Sync {
    /// Reads and parses the stored document.
    fn load(&self) -> Result<ConfigNode, ConfigLoadError>;
    /// Overwrites the stored document.
    fn save(&self, node: &ConfigNode) -> std::io::Result<()>;
}

/// Stores the document as a text file, usually `<exe dir>/config/lcdex.cfg`.
pub struct FileNodeStore {
    path: PathBuf,
}

impl FileNodeStore {
    const CONFIG_DIR: &'static str = "config";
    const FILE_NAME: &'static str = "lcdex.cfg";
    const DIR_OVERRIDE_VAR: &'static str = "LCD_CONFIG_DIR";

    /// Creates a store for `dir/lcdex.cfg`, creating `dir` if it is absent.
    pub fn in_dir(dir: &Path) -> std::io::Result<Self> {
        if !dir.exists() {
            std::fs::create_dir_all(dir)?;
        }
        Ok(Self { path: dir.join(Self::FILE_NAME) })
    }

    /// Resolves the `config` directory beside the running executable,
    /// or the directory named by `LCD_CONFIG_DIR` if that is set.
    pub fn beside_executable() -> std::io::Result<Self> {
        if let Ok(dir) = std::env::var(Self::DIR_OVERRIDE_VAR) {
            return Self::in_dir(Path::new(&dir));
        }
        let exe = std::env::current_exe()?;
        let base = exe.parent().map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        Self::in_dir(&base.join(Self::CONFIG_DIR))
    }

    pub fn path(&self) -> &Path { &self.path }
}

impl NodeStore for FileNodeStore {
    fn load(&self) -> Result<ConfigNode, ConfigLoadError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigLoadError::Missing { path: self.path.display().to_string() });
            }
            Err(reason) => return Err(ConfigLoadError::Io { reason }),
        };
        ConfigNode::parse(&text)
    }

    fn save(&self, node: &ConfigNode) -> std::io::Result<()> {
        std::fs::write(&self.path, node.to_string())
    }
}
