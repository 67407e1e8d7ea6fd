// imports
use crate::corpus::Vocabulary;
use crate::errors::Result;
use crate::types::{Entry, TokenId};

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, IoSlice};
use std::io::prelude::*;
use std::path::Path;
use flate2::{Compression, read::GzDecoder, write::GzEncoder};
use ndarray::{array, s, Array1, Array2};
use ndarray_npy::write_npy;


pub fn read_input<R: ReadFile>(file_path: &str) -> Result<R> {
    R::read_file(file_path)
}

pub fn save_output<S: SaveFile + ?Sized>(output_dir: &str, file_name: &str, item: &S) -> Result<()> {

    // create output folder
    fs::create_dir_all(output_dir)?;
    item.save_file(output_dir, file_name)
}

fn out_path(output_dir: &str, file_name: &str, suffix: &str) -> String {
    Path::new(output_dir).join(format!("{}{}", file_name, suffix)).display().to_string()
}

pub trait ReadFile: Sized {
    fn read_file(file_path: &str) -> Result<Self>;
}

pub trait SaveFile {
    fn save_file(&self, output_dir: &str, file_name: &str) -> Result<()>;
}


// gz parts are named `<file_path>0.gz`, `<file_path>1.gz` ... and read until the first missing index
impl ReadFile for Vec<Vec<u8>> {
    fn read_file(file_path: &str) -> Result<Self> {

        let mut items: Vec<Vec<u8>> = Vec::new();
        loop {
            let in_file = format!("{}{}.gz", file_path, items.len());
            let f = match File::open(&in_file) {
                Ok(f) => BufReader::new(f),
                Err(e) if e.kind() == ErrorKind::NotFound => break,
                Err(e) => return Err(e.into()),
            };
            let mut reader = GzDecoder::new(f);
            let mut buf: Vec<u8> = Vec::new();
            reader.read_to_end(&mut buf)?;
            items.push(buf);
        }

        Ok(items)
    }
}

impl ReadFile for Vocabulary {
    fn read_file(file_path: &str) -> Result<Self> {
        let in_file = file_path.to_string() + ".txt";
        let f = BufReader::new(File::open(in_file)?);
        let t2i: HashMap<String, TokenId> = serde_json::from_reader(f)?;
        Ok(Vocabulary::from_map(t2i))
    }
}

impl SaveFile for [Vec<u8>] {
    fn save_file(&self, output_dir: &str, file_name: &str) -> Result<()> {

        for (i, buf) in self.iter().enumerate() {

            let out = out_path(output_dir, file_name, &format!("{}.gz", i));
            let f = BufWriter::new(File::create(out)?);
            let mut writer = GzEncoder::new(f, Compression::default());

            let slice = IoSlice::new(buf);
            writer.write_all(&slice)?;
            writer.finish()?.flush()?;
        }

        Ok(())
    }
}

impl SaveFile for [Entry] {
    fn save_file(&self, output_dir: &str, file_name: &str) -> Result<()> {

        let out = out_path(output_dir, file_name, ".csv");
        let mut wrt = csv::WriterBuilder::new().from_path(out)?;
        wrt.write_record(["Token", "Context", "Cooc"])?;

        for e in self {
            wrt.serialize((e.target, e.context, e.weight))?;
        }
        wrt.flush()?;
        Ok(())
    }
}

impl SaveFile for Array2<f64> {
    fn save_file(&self, output_dir: &str, file_name: &str) -> Result<()> {
        let out = out_path(output_dir, file_name, ".npy");
        write_npy(out, self)?;
        Ok(())
    }
}

impl SaveFile for Vocabulary {
    fn save_file(&self, output_dir: &str, file_name: &str) -> Result<()> {
        let out = out_path(output_dir, file_name, ".txt");
        let f = BufWriter::new(File::create(out)?);
        serde_json::to_writer(f, self.t2i())?;
        Ok(())
    }
}


/// Entries as rows of `[target, context, weight]`
pub fn entries_to_ndarray(entries: &[Entry]) -> Array2<f64> {

    let mut nd_array: Array2<f64> = Array2::zeros((entries.len(), 3));
    for (i, e) in entries.iter().enumerate() {
        let line: Array1<f64> = array![e.target as f64, e.context as f64, e.weight];
        nd_array.slice_mut(s![i, ..]).assign(&line);
    }
    nd_array
}

pub fn serialize_entries(entries: &[Entry]) -> Result<Vec<u8>> {
    Ok(bincode::serialize(entries)?)
}

pub fn deserialize_entries(bytes: &[u8]) -> Result<Vec<Entry>> {
    Ok(bincode::deserialize(bytes)?)
}
