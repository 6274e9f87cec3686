use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use bincode::Options;

use crate::error::EngineError;

pub fn save_to_disk<T: Serialize, TPath: AsRef<Path>>(
    data: &T,
    path: TPath,
) -> Result<(), EngineError> {
    let options = bincode::DefaultOptions::new();
    let options = options.with_no_limit();
    // Write all bytes to the target file
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    options.serialize_into(writer, data)?;
    Ok(())
}

pub fn load_from_disk<T: DeserializeOwned, TPath: AsRef<Path>>(
    path: TPath,
) -> Result<T, EngineError> {
    // Open the file and read all bytes
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let options = bincode::DefaultOptions::new();
    let options = options.with_no_limit();
    Ok(options.deserialize_from(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let data = vec![("word".to_string(), 42u32)];
        let path = std::env::temp_dir().join("anaphrase_test_serialization.bin");
        save_to_disk(&data, &path).unwrap();
        let loaded: Vec<(String, u32)> = load_from_disk(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, data);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let missing = std::env::temp_dir().join("anaphrase_no_such_file.bin");
        match load_from_disk::<Vec<u32>, _>(&missing) {
            Err(EngineError::Io(_)) => {}
            other => panic!("expected Io error, got {:?}", other.map(|_| ())),
        }
    }
}
