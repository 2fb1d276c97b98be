use crate::runtime::{
    data_structures::byte_buffer::{ByteBuffer, ByteBufferPtr},
    error::{self, ScriptError},
};
use std::{
    fs::{File, OpenOptions},
    io::{Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

/// The fixed size of a single Forth block, in bytes.  Block numbering starts at 1; block 0 is not
/// addressable.
pub const BLOCK_SIZE: usize = 1024;

fn blank_block() -> [u8; BLOCK_SIZE] {
    [b' '; BLOCK_SIZE]
}

/// Best effort advisory exclusive lock on the open block file.  A no-op on platforms without
/// `libc::flock`; failing to acquire the lock there just means two interpreters could in principle
/// step on each other's writes, same as the donor's own unix-only use of `libc` elsewhere.
#[cfg(unix)]
fn lock_exclusive(file: &File) -> std::io::Result<()> {
    use std::os::unix::io::AsRawFd;

    let result = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };

    if result == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn lock_exclusive(_file: &File) -> std::io::Result<()> {
    Ok(())
}

/// The backing store for the block subsystem: a flat file of fixed size records, numbered from 1,
/// extended with space-padded blocks as reads and writes reach past its current end.
pub struct BlockFile {
    file: File,
    path: PathBuf,
}

impl BlockFile {
    /// Open (creating if necessary) the block file at `path`, holding an advisory exclusive lock
    /// on it for as long as this `BlockFile` lives.  If the lock can't be acquired against `path`,
    /// (for example another interpreter already holds it,) retry against the same file name
    /// inside `$HOME`.
    pub fn open_with_fallback(path: &str) -> error::Result<BlockFile> {
        match Self::open(path) {
            Ok(block_file) => Ok(block_file),

            Err(original_error) => {
                let file_name = Path::new(path)
                    .file_name()
                    .ok_or(())
                    .map_err(|_| original_error.clone())?;

                let home = std::env::var("HOME").map_err(|_| original_error.clone())?;
                let fallback_path = Path::new(&home).join(file_name);

                Self::open(fallback_path.to_string_lossy().as_ref()).map_err(|_| original_error)
            }
        }
    }

    fn open(path: &str) -> error::Result<BlockFile> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;

        if lock_exclusive(&file).is_err() {
            return Err(ScriptError::new(
                None,
                format!("Could not acquire exclusive lock on block file {}.", path),
                None,
            ));
        }

        Ok(BlockFile {
            file,
            path: PathBuf::from(path),
        })
    }

    /// Path this block file was opened from, (which may be the `$HOME` fallback, not the path
    /// originally requested.)
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read block `number`, (1-indexed,) extending the file with blank blocks first if it doesn't
    /// reach that far yet.
    pub fn read(&mut self, number: usize) -> error::Result<[u8; BLOCK_SIZE]> {
        self.ensure_extends_to(number)?;

        let offset = (number - 1) as u64 * BLOCK_SIZE as u64;
        self.file.seek(SeekFrom::Start(offset))?;

        let mut data = blank_block();
        self.file.read_exact(&mut data)?;

        Ok(data)
    }

    /// Write block `number`, (1-indexed,) extending the file with blank blocks first if needed.
    pub fn write(&mut self, number: usize, data: &[u8]) -> error::Result<()> {
        self.ensure_extends_to(number)?;

        let offset = (number - 1) as u64 * BLOCK_SIZE as u64;
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(data)?;
        self.file.flush()?;

        Ok(())
    }

    fn ensure_extends_to(&mut self, number: usize) -> error::Result<()> {
        let required_len = number as u64 * BLOCK_SIZE as u64;
        let current_len = self.file.metadata()?.len();

        if current_len < required_len {
            self.file.seek(SeekFrom::End(0))?;

            let mut remaining = required_len - current_len;
            let blank = blank_block();

            while remaining > 0 {
                let chunk = remaining.min(BLOCK_SIZE as u64) as usize;
                self.file.write_all(&blank[0..chunk])?;
                remaining -= chunk as u64;
            }

            self.file.flush()?;
        }

        Ok(())
    }
}

/// The single dirty-tracked block resident in memory at a time, matching the write-back cache
/// spec.md describes: at most one block is ever held in RAM, and it's only written back to disk
/// when it's evicted (by loading a different block) or explicitly flushed.
///
/// The resident block's bytes live in an ordinary `ByteBufferPtr`, the same reference counted byte
/// buffer that `buffer.new` hands out, so `BLOCK`/`BUFFER` can push it straight onto the data stack
/// and have the existing `buffer.int@`/`buffer.string!`/etc. words read and write it in place;
/// there's no separate block-content API to learn.
pub struct BlockBuffer {
    number: Option<usize>,
    data: ByteBufferPtr,
    dirty: bool,
}

impl BlockBuffer {
    pub fn new() -> BlockBuffer {
        BlockBuffer {
            number: None,
            data: ByteBuffer::new_ptr(BLOCK_SIZE),
            dirty: false,
        }
    }

    pub fn data(&self) -> ByteBufferPtr {
        self.data.clone()
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Write the resident block back to `file` if it's dirty, clearing the dirty flag either way.
    pub fn flush_to(&mut self, file: &mut BlockFile) -> error::Result<()> {
        if self.dirty {
            if let Some(number) = self.number {
                file.write(number, self.data.borrow().buffer())?;
            }

            self.dirty = false;
        }

        Ok(())
    }

    /// Make `number` the resident block, flushing whatever was resident before if it was dirty
    /// and reading `number`'s contents in fresh from `file`.
    pub fn load(&mut self, number: usize, file: &mut BlockFile) -> error::Result<()> {
        if self.number != Some(number) {
            self.flush_to(file)?;

            let bytes = file.read(number)?;
            self.data = ByteBuffer::new_ptr(BLOCK_SIZE);
            self.data.borrow_mut().buffer_mut().copy_from_slice(&bytes);

            self.number = Some(number);
            self.dirty = false;
        }

        Ok(())
    }

    /// Make `number` the resident block without reading it from disk first, (the `BUFFER` word's
    /// semantics: the caller is about to overwrite the whole thing anyway.)  Still flushes
    /// whatever was resident before if it was dirty.
    pub fn assign(&mut self, number: usize, file: &mut BlockFile) -> error::Result<()> {
        if self.number != Some(number) {
            self.flush_to(file)?;

            self.data = ByteBuffer::new_ptr(BLOCK_SIZE);
            self.data.borrow_mut().buffer_mut().fill(b' ');

            self.number = Some(number);
            self.dirty = false;
        }

        Ok(())
    }

    /// Discard the resident block without writing it back, regardless of its dirty flag.
    pub fn empty(&mut self) {
        self.number = None;
        self.data = ByteBuffer::new_ptr(BLOCK_SIZE);
        self.dirty = false;
    }
}

impl Default for BlockBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything the interpreter needs to implement `BLOCK`/`BUFFER`/`UPDATE`/`FLUSH`/
/// `SAVE-BUFFERS`/`EMPTY-BUFFERS`: the lazily opened backing file plus the single resident buffer.
pub struct BlockStorage {
    path: Option<String>,
    file: Option<BlockFile>,
    buffer: BlockBuffer,
}

impl BlockStorage {
    pub fn new() -> BlockStorage {
        BlockStorage {
            path: None,
            file: None,
            buffer: BlockBuffer::new(),
        }
    }

    pub fn set_path(&mut self, path: String) {
        self.path = Some(path);
        self.file = None;
    }

    fn file(&mut self) -> error::Result<&mut BlockFile> {
        if self.file.is_none() {
            let path = self
                .path
                .clone()
                .unwrap_or_else(|| "blocks.fb".to_string());

            self.file = Some(BlockFile::open_with_fallback(&path)?);
        }

        Ok(self.file.as_mut().unwrap())
    }

    /// `BLOCK`: make `number` resident, reading it from disk if it wasn't already, and return the
    /// byte buffer backing it.
    pub fn block(&mut self, number: usize) -> error::Result<ByteBufferPtr> {
        let file = self.file()?;
        self.buffer.load(number, file)?;

        Ok(self.buffer.data())
    }

    /// `BUFFER`: make `number` resident without reading it from disk, and return the byte buffer
    /// backing it, (blank.)
    pub fn buffer(&mut self, number: usize) -> error::Result<ByteBufferPtr> {
        let file = self.file()?;
        self.buffer.assign(number, file)?;

        Ok(self.buffer.data())
    }

    pub fn update(&mut self) {
        self.buffer.mark_dirty();
    }

    pub fn flush(&mut self) -> error::Result<()> {
        let file = self.file()?;
        self.buffer.flush_to(file)?;
        self.buffer.empty();

        Ok(())
    }

    pub fn save_buffers(&mut self) -> error::Result<()> {
        let file = self.file()?;
        self.buffer.flush_to(file)
    }

    pub fn empty_buffers(&mut self) {
        self.buffer.empty();
    }
}

impl Default for BlockStorage {
    fn default() -> Self {
        Self::new()
    }
}
