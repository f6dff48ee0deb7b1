use std::{
    env,
    path::{Path, PathBuf},
};

use tracing::info;

use crate::error::SetupError;
use crate::job::Executable;

/// Ubicaciones relativas dentro de la instalación de flex_extract.
pub const CONTROL_SUBDIR: &str = "Run/Control";
pub const SUBMIT_SCRIPT: &str = "Source/Python/submit.py";

/// Ejecutable y CONTROL file por defecto, ya validados.
#[derive(Debug, Clone)]
pub struct Installation {
    pub executable: PathBuf,
    pub control_file: PathBuf,
}

impl Installation {
    /// Busca `Source/Python/submit.py` y `Run/Control/<control_name>`
    /// dentro de la carpeta de instalación.
    pub fn resolve(flex_extract_dir: &Path, control_name: &str) -> Result<Self, SetupError> {
        let control_file = flex_extract_dir.join(CONTROL_SUBDIR).join(control_name);
        let executable = flex_extract_dir.join(SUBMIT_SCRIPT);
        Self::from_paths(executable, control_file)
    }

    /// Valida rutas explícitas. El ejecutable se guarda como ruta absoluta.
    pub fn from_paths(
        executable: impl Into<PathBuf>,
        control_file: impl Into<PathBuf>,
    ) -> Result<Self, SetupError> {
        let executable = absolute(executable.into());
        if !executable.is_file() {
            return Err(SetupError::MissingExecutable(executable));
        }

        let control_file = control_file.into();
        if !control_file.is_file() {
            return Err(SetupError::MissingControlFile(control_file));
        }

        info!(
            "instalación validada: ejecutable={} control={}",
            executable.display(),
            control_file.display()
        );

        Ok(Self {
            executable,
            control_file,
        })
    }

    /// Invocación del script: `<python> -u submit.py ...` o, sin intérprete,
    /// el ejecutable directo.
    pub fn invocation(&self, python: Option<&str>) -> Executable {
        match python {
            Some(interpreter) => Executable::python(interpreter, &self.executable),
            None => Executable::direct(&self.executable),
        }
    }
}

fn absolute(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    match env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fake_install() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join(CONTROL_SUBDIR)).unwrap();
        fs::create_dir_all(dir.path().join("Source/Python")).unwrap();
        fs::write(dir.path().join(SUBMIT_SCRIPT), "print('hola')\n").unwrap();
        fs::write(
            dir.path().join(CONTROL_SUBDIR).join("CONTROL_EI.public"),
            "START_DATE 20130101\n",
        )
        .unwrap();
        dir
    }

    #[test]
    fn resolve_encuentra_script_y_control() {
        let dir = fake_install();
        let inst = Installation::resolve(dir.path(), "CONTROL_EI.public").unwrap();

        assert!(inst.executable.ends_with(SUBMIT_SCRIPT));
        assert!(inst.executable.is_absolute());
        assert!(inst.control_file.ends_with("Run/Control/CONTROL_EI.public"));
    }

    #[test]
    fn resolve_falla_sin_control_file() {
        let dir = fake_install();
        let err = Installation::resolve(dir.path(), "CONTROL_EA5").unwrap_err();
        assert!(matches!(err, SetupError::MissingControlFile(_)));
    }

    #[test]
    fn resolve_falla_sin_submit_py() {
        let dir = fake_install();
        fs::remove_file(dir.path().join(SUBMIT_SCRIPT)).unwrap();

        let err = Installation::resolve(dir.path(), "CONTROL_EI.public").unwrap_err();
        assert!(matches!(err, SetupError::MissingExecutable(_)));
    }

    #[test]
    fn sin_nada_se_reporta_primero_el_ejecutable() {
        let dir = tempfile::tempdir().unwrap();
        let err = Installation::resolve(dir.path(), "CONTROL_EI.public").unwrap_err();
        assert!(matches!(err, SetupError::MissingExecutable(_)));
    }

    #[test]
    fn invocation_con_python_antepone_interprete() {
        let dir = fake_install();
        let inst = Installation::resolve(dir.path(), "CONTROL_EI.public").unwrap();

        let exe = inst.invocation(Some("python3"));
        assert_eq!(exe.program, PathBuf::from("python3"));
        assert_eq!(exe.leading_args[0], "-u");
        assert!(exe.leading_args[1].ends_with("submit.py"));

        let direct = inst.invocation(None);
        assert_eq!(direct.program, inst.executable);
        assert!(direct.leading_args.is_empty());
    }
}
