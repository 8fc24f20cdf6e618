use std::path::PathBuf;

const EMBED_ENV: &str = "JARMAP_EMBED_ARCHIVE";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-env-changed={EMBED_ENV}");

    let out_dir = PathBuf::from(std::env::var("OUT_DIR")?);
    let generated = match std::env::var_os(EMBED_ENV) {
        Some(path) => {
            let path = std::fs::canonicalize(PathBuf::from(path))?;
            println!("cargo:rerun-if-changed={}", path.display());
            format!(
                "pub static EMBEDDED_ARCHIVE: Option<&[u8]> = Some(include_bytes!({:?}));\n",
                path
            )
        }
        None => "pub static EMBEDDED_ARCHIVE: Option<&[u8]> = None;\n".to_string(),
    };

    std::fs::write(out_dir.join("embedded.rs"), generated)?;
    Ok(())
}
