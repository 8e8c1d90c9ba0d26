use std::fs;
use std::process::Command;

/// Hands an essay answer to `$EDITOR` through a temp file and returns the
/// edited text. The caller suspends and restores the terminal around this.
pub fn open_editor(initial_content: &str) -> Result<String, String> {
    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vim".to_string());

    let tmp_dir = std::env::temp_dir();
    let tmp_file = tmp_dir.join(format!("termcbt_{}.txt", std::process::id()));

    fs::write(&tmp_file, initial_content)
        .map_err(|e| format!("Cannot write temp file: {}", e))?;

    let status = Command::new(&editor)
        .arg(&tmp_file)
        .status()
        .map_err(|e| format!("Cannot open editor '{}': {}", editor, e))?;

    if !status.success() {
        let _ = fs::remove_file(&tmp_file);
        return Err("Editor exited with error".to_string());
    }

    let result = fs::read_to_string(&tmp_file)
        .map_err(|e| format!("Cannot read editor result: {}", e))?;

    let _ = fs::remove_file(&tmp_file);
    Ok(result)
}
