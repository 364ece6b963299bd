/*!
 * Memory request algebra
 *
 * Every variant validates its fields at construction time, so a `Request`
 * value in hand is always safe to feed directly to a strategy.
 */

use serde::{Deserialize, Serialize};
use thiserror::Error;

const PAGE_BYTES: i32 = 4096;

/// Range/consistency failures raised when constructing a `Request`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequestError {
    #[error("invalid pid: {0}")]
    InvalidPid(i32),
    #[error("invalid byte count: {0}")]
    InvalidBytes(i32),
    #[error("invalid page count: {0}")]
    InvalidPages(i32),
    #[error("invalid address: {0}")]
    InvalidAddress(i32),
}

fn check_pid(pid: i32) -> Result<(), RequestError> {
    if !(-1..=255).contains(&pid) {
        return Err(RequestError::InvalidPid(pid));
    }
    Ok(())
}

fn check_bytes_pages(bytes: i32, pages: i32) -> Result<(), RequestError> {
    if !(1..=256 * PAGE_BYTES).contains(&bytes) {
        return Err(RequestError::InvalidBytes(bytes));
    }
    if !(1..=256).contains(&pages) {
        return Err(RequestError::InvalidPages(pages));
    }
    if bytes <= (pages - 1) * PAGE_BYTES || bytes > pages * PAGE_BYTES {
        return Err(RequestError::InvalidBytes(bytes));
    }
    Ok(())
}

/// Requests a new process be created and allocated its initial memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProcessReq {
    pub pid: i32,
    pub bytes: i32,
    pub pages: i32,
}

impl CreateProcessReq {
    pub fn new(pid: i32, bytes: i32, pages: i32) -> Result<Self, RequestError> {
        check_pid(pid)?;
        check_bytes_pages(bytes, pages)?;
        Ok(Self { pid, bytes, pages })
    }
}

/// Requests every block owned by `pid` be freed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminateProcessReq {
    pub pid: i32,
}

impl TerminateProcessReq {
    pub fn new(pid: i32) -> Result<Self, RequestError> {
        check_pid(pid)?;
        Ok(Self { pid })
    }
}

/// Requests additional memory be allocated to an already-existing process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocateMemoryReq {
    pub pid: i32,
    pub bytes: i32,
    pub pages: i32,
}

impl AllocateMemoryReq {
    pub fn new(pid: i32, bytes: i32, pages: i32) -> Result<Self, RequestError> {
        check_pid(pid)?;
        check_bytes_pages(bytes, pages)?;
        Ok(Self { pid, bytes, pages })
    }
}

/// Requests the block starting at `address` and owned by `pid` be freed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeMemoryReq {
    pub pid: i32,
    pub address: i32,
}

impl FreeMemoryReq {
    pub fn new(pid: i32, address: i32) -> Result<Self, RequestError> {
        check_pid(pid)?;
        if !(0..=255).contains(&address) {
            return Err(RequestError::InvalidAddress(address));
        }
        Ok(Self { pid, address })
    }
}

/// A validated request against the memory subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    #[serde(rename = "CREATE_PROCESS")]
    CreateProcess(CreateProcessReq),
    #[serde(rename = "TERMINATE_PROCESS")]
    TerminateProcess(TerminateProcessReq),
    #[serde(rename = "ALLOCATE_MEMORY")]
    AllocateMemory(AllocateMemoryReq),
    #[serde(rename = "FREE_MEMORY")]
    FreeMemory(FreeMemoryReq),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_process_req_rejects_bad_byte_page_pairing() {
        // 1 page = up to 4096 bytes; asking for 2 pages but only 1 byte is invalid.
        assert_eq!(
            CreateProcessReq::new(1, 1, 2),
            Err(RequestError::InvalidBytes(1))
        );
    }

    #[test]
    fn create_process_req_accepts_exact_page_boundary() {
        assert!(CreateProcessReq::new(1, 4096, 1).is_ok());
        assert!(CreateProcessReq::new(1, 4097, 1).is_err());
    }

    #[test]
    fn free_memory_req_rejects_bad_address() {
        assert_eq!(
            FreeMemoryReq::new(1, 256),
            Err(RequestError::InvalidAddress(256))
        );
    }
}
