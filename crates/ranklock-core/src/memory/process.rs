//! Process attach, module resolution, and liveness checks.

use std::path::PathBuf;

use crate::error::Result;
#[cfg(not(target_os = "windows"))]
use crate::error::Error;

/// An attached external process.
///
/// Owns the OS handle for the lifetime of the monitoring session; the base
/// address of the main module is resolved once at attach time and assumed
/// stable until the process exits.
pub struct ProcessHandle {
    pub pid: u32,
    /// Base address of the main executable module.
    pub base_address: u64,
    /// On-disk path of the main executable module.
    pub module_path: PathBuf,
    #[cfg(target_os = "windows")]
    handle: windows::Win32::Foundation::HANDLE,
}

#[cfg(target_os = "windows")]
mod imp {
    use std::os::windows::ffi::OsStrExt;
    use std::path::PathBuf;

    use tracing::debug;
    use windows::Win32::Foundation::{CloseHandle, HANDLE, STILL_ACTIVE};
    use windows::Win32::System::Diagnostics::ToolHelp::{
        CreateToolhelp32Snapshot, MODULEENTRY32W, Module32FirstW, Module32NextW, PROCESSENTRY32W,
        Process32FirstW, Process32NextW, TH32CS_SNAPMODULE, TH32CS_SNAPMODULE32,
        TH32CS_SNAPPROCESS,
    };
    use windows::Win32::System::Threading::{
        GetExitCodeProcess, OpenProcess, PROCESS_QUERY_LIMITED_INFORMATION, PROCESS_VM_OPERATION,
        PROCESS_VM_READ, PROCESS_VM_WRITE,
    };

    use super::ProcessHandle;
    use crate::error::{Error, Result};

    fn utf16_name(buf: &[u16]) -> String {
        let end = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
        String::from_utf16_lossy(&buf[..end])
    }

    /// Find the pid of the first process whose executable name matches
    /// (case-insensitive, with or without the `.exe` suffix).
    pub fn find_pid(process_name: &str) -> Result<u32> {
        let wanted = process_name.to_lowercase();

        // SAFETY: a process snapshot takes no input pointers.
        let snapshot = unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0) }
            .map_err(|e| Error::ProcessOpenFailed(e.message().to_string()))?;

        let mut entry = PROCESSENTRY32W {
            dwSize: std::mem::size_of::<PROCESSENTRY32W>() as u32,
            ..Default::default()
        };

        let mut found = None;
        // SAFETY: entry.dwSize is initialized and the snapshot handle is valid.
        let mut ok = unsafe { Process32FirstW(snapshot, &mut entry) };
        while ok.is_ok() {
            let name = utf16_name(&entry.szExeFile).to_lowercase();
            if name == wanted || name.trim_end_matches(".exe") == wanted {
                found = Some(entry.th32ProcessID);
                break;
            }
            // SAFETY: same as above.
            ok = unsafe { Process32NextW(snapshot, &mut entry) };
        }

        // SAFETY: snapshot came from CreateToolhelp32Snapshot above.
        unsafe {
            let _ = CloseHandle(snapshot);
        }

        found.ok_or_else(|| Error::ProcessNotFound(process_name.to_string()))
    }

    /// Resolve the base address and path of a named module inside the process.
    pub fn module_base(pid: u32, module_name: &str) -> Result<(u64, PathBuf)> {
        let wanted = module_name.to_lowercase();

        // SAFETY: a module snapshot takes no input pointers.
        let snapshot =
            unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPMODULE | TH32CS_SNAPMODULE32, pid) }
                .map_err(|e| Error::ModuleNotFound(format!("{module_name}: {}", e.message())))?;

        let mut entry = MODULEENTRY32W {
            dwSize: std::mem::size_of::<MODULEENTRY32W>() as u32,
            ..Default::default()
        };

        let mut found = None;
        // SAFETY: entry.dwSize is initialized and the snapshot handle is valid.
        let mut ok = unsafe { Module32FirstW(snapshot, &mut entry) };
        while ok.is_ok() {
            if utf16_name(&entry.szModule).to_lowercase() == wanted {
                found = Some((
                    entry.modBaseAddr as u64,
                    PathBuf::from(utf16_name(&entry.szExePath)),
                ));
                break;
            }
            // SAFETY: same as above.
            ok = unsafe { Module32NextW(snapshot, &mut entry) };
        }

        // SAFETY: snapshot came from CreateToolhelp32Snapshot above.
        unsafe {
            let _ = CloseHandle(snapshot);
        }

        found.ok_or_else(|| Error::ModuleNotFound(module_name.to_string()))
    }

    pub fn open(pid: u32, module_name: &str) -> Result<ProcessHandle> {
        // Module resolution happens before OpenProcess so a missing module
        // short-circuits without leaving a handle open.
        let (base_address, module_path) = module_base(pid, module_name)?;

        // SAFETY: OpenProcess takes no pointers; the returned handle is owned
        // by ProcessHandle and closed on drop.
        let handle = unsafe {
            OpenProcess(
                PROCESS_QUERY_LIMITED_INFORMATION
                    | PROCESS_VM_READ
                    | PROCESS_VM_WRITE
                    | PROCESS_VM_OPERATION,
                false,
                pid,
            )
        }
        .map_err(|e| Error::ProcessOpenFailed(format!("pid {pid}: {}", e.message())))?;

        debug!("Opened process {} (module base {:#x})", pid, base_address);

        Ok(ProcessHandle {
            pid,
            base_address,
            module_path,
            handle,
        })
    }

    pub fn is_alive(process: &ProcessHandle) -> bool {
        let mut code = 0u32;
        // SAFETY: the handle is valid while the ProcessHandle exists.
        match unsafe { GetExitCodeProcess(process.handle, &mut code) } {
            Ok(()) => code == STILL_ACTIVE.0 as u32,
            Err(_) => false,
        }
    }

    /// Query the "a.b.c.d" file version of the main module, best-effort.
    pub fn file_version(process: &ProcessHandle) -> Result<Option<String>> {
        use windows::Win32::Storage::FileSystem::{
            GetFileVersionInfoSizeW, GetFileVersionInfoW, VS_FIXEDFILEINFO, VerQueryValueW,
        };
        use windows::core::{PCWSTR, w};

        let mut path: Vec<u16> = process
            .module_path
            .as_os_str()
            .encode_wide()
            .chain(std::iter::once(0))
            .collect();
        let path = PCWSTR(path.as_mut_ptr());

        // SAFETY: path is a valid null-terminated wide string for this call.
        let size = unsafe { GetFileVersionInfoSizeW(path, None) };
        if size == 0 {
            return Ok(None);
        }

        let mut data = vec![0u8; size as usize];
        // SAFETY: data is exactly `size` bytes as reported by the size query.
        unsafe {
            GetFileVersionInfoW(path, 0, size, data.as_mut_ptr() as *mut core::ffi::c_void)
                .map_err(|e| Error::Io(std::io::Error::other(e.message())))?;
        }

        let mut info_ptr: *mut core::ffi::c_void = std::ptr::null_mut();
        let mut info_len = 0u32;
        // SAFETY: the version block lives in `data` for the whole call; the
        // root query returns a pointer into that block.
        let ok = unsafe { VerQueryValueW(data.as_ptr() as _, w!("\\"), &mut info_ptr, &mut info_len) };
        if !ok.as_bool() || info_ptr.is_null() || (info_len as usize) < size_of::<VS_FIXEDFILEINFO>()
        {
            return Ok(None);
        }

        // SAFETY: checked non-null and large enough above; points into `data`.
        let info = unsafe { &*(info_ptr as *const VS_FIXEDFILEINFO) };
        Ok(Some(format!(
            "{}.{}.{}.{}",
            info.dwFileVersionMS >> 16,
            info.dwFileVersionMS & 0xFFFF,
            info.dwFileVersionLS >> 16,
            info.dwFileVersionLS & 0xFFFF,
        )))
    }

    impl ProcessHandle {
        pub(crate) fn raw_handle(&self) -> HANDLE {
            self.handle
        }
    }

    impl Drop for ProcessHandle {
        fn drop(&mut self) {
            // SAFETY: the handle was opened by OpenProcess and not closed since.
            unsafe {
                let _ = CloseHandle(self.handle);
            }
        }
    }
}

impl ProcessHandle {
    /// Locate a process by executable name and attach to it.
    pub fn find_and_open(process_name: &str, module_name: &str) -> Result<Self> {
        let pid = Self::find_pid(process_name)?;
        Self::open(pid, module_name)
    }

    #[cfg(target_os = "windows")]
    pub fn find_pid(process_name: &str) -> Result<u32> {
        imp::find_pid(process_name)
    }

    #[cfg(target_os = "windows")]
    pub fn open(pid: u32, module_name: &str) -> Result<Self> {
        imp::open(pid, module_name)
    }

    /// Whether the target process is still running.
    #[cfg(target_os = "windows")]
    pub fn is_alive(&self) -> bool {
        imp::is_alive(self)
    }

    /// File version of the main module ("a.b.c.d"), if the executable carries
    /// a version resource.
    #[cfg(target_os = "windows")]
    pub fn file_version(&self) -> Result<Option<String>> {
        imp::file_version(self)
    }

    #[cfg(not(target_os = "windows"))]
    pub fn find_pid(_process_name: &str) -> Result<u32> {
        Err(Error::UnsupportedPlatform("Process discovery"))
    }

    #[cfg(not(target_os = "windows"))]
    pub fn open(_pid: u32, _module_name: &str) -> Result<Self> {
        Err(Error::UnsupportedPlatform("Process attach"))
    }

    #[cfg(not(target_os = "windows"))]
    pub fn is_alive(&self) -> bool {
        false
    }

    #[cfg(not(target_os = "windows"))]
    pub fn file_version(&self) -> Result<Option<String>> {
        Err(Error::UnsupportedPlatform("Version query"))
    }
}
