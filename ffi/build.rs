//! Generates `include/http_client.h` from the `extern "C"` surface.

fn main() {
    println!("cargo:rerun-if-changed=src");

    let Ok(crate_dir) = std::env::var("CARGO_MANIFEST_DIR") else {
        return;
    };
    let include_dir = std::path::Path::new(&crate_dir).join("include");

    match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("HTTP_CLIENT_H")
        .generate()
    {
        Ok(bindings) => {
            if let Err(e) = std::fs::create_dir_all(&include_dir) {
                println!("cargo:warning=cannot create {}: {e}", include_dir.display());
                return;
            }
            bindings.write_to_file(include_dir.join("http_client.h"));
        }
        Err(e) => println!("cargo:warning=header generation skipped: {e}"),
    }
}
