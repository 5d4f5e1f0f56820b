//! Print a fresh VAPID keypair as environment lines
//!
//! ```bash
//! cargo run -p flock-keygen >> .env
//! ```

use std::io::Write;
use std::process::ExitCode;

use flock_common::{VapidError, VapidKeyPair};

/// Generate a keypair and re-load it from its encoded form, so a key that
/// would not load at server startup is never printed.
fn generate() -> Result<(String, String), VapidError> {
    let pair = VapidKeyPair::generate();
    let public_key = pair.public_key_base64();
    let private_key = pair.private_key_base64();
    VapidKeyPair::from_base64(&public_key, &private_key)?;
    Ok((public_key, private_key))
}

fn main() -> ExitCode {
    let (public_key, private_key) = match generate() {
        Ok(keys) => keys,
        Err(e) => {
            eprintln!("flock-keygen: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut stdout = std::io::stdout().lock();
    if let Err(e) = writeln!(stdout, "VAPID_PUBLIC_KEY={public_key}")
        .and_then(|()| writeln!(stdout, "VAPID_PRIVATE_KEY={private_key}"))
        .and_then(|()| stdout.flush())
    {
        eprintln!("flock-keygen: failed to write keys: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
