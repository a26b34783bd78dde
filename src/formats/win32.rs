//! Win32 `INPUT` records for batched input injection
//!
//! `INPUT` is a `DWORD type` followed by a union of `MOUSEINPUT`, `KEYBDINPUT` and
//! `HARDWAREINPUT`. The union is pointer aligned, so its offset and the record size
//! depend on the target ABI:
//!
//! | ABI | union offset | `sizeof(INPUT)` | `dwExtraInfo` (keyboard / mouse) |
//! |-----|--------------|-----------------|----------------------------------|
//! | x64 | 8            | 40              | 24 / 32, 8 bytes                 |
//! | x86 | 4            | 28              | 16 / 24, 4 bytes                 |
//!
//! The batches built here are ready to be handed to a `SendInput`-style call as
//! `(count, buffer.as_ptr(), record_size)`. This crate does not make that call.

use std::sync::LazyLock;

use tracing::debug;

use crate::{ByteBuffer, FieldDescriptor, FieldKind, MarshalError, Result, StructLayout, Value};

pub const INPUT_MOUSE: u32 = 0;
pub const INPUT_KEYBOARD: u32 = 1;
pub const INPUT_HARDWARE: u32 = 2;

pub const KEYEVENTF_EXTENDEDKEY: u32 = 0x0001;
pub const KEYEVENTF_KEYUP: u32 = 0x0002;
pub const KEYEVENTF_UNICODE: u32 = 0x0004;
pub const KEYEVENTF_SCANCODE: u32 = 0x0008;

pub const MOUSEEVENTF_MOVE: u32 = 0x0001;
pub const MOUSEEVENTF_LEFTDOWN: u32 = 0x0002;
pub const MOUSEEVENTF_LEFTUP: u32 = 0x0004;
pub const MOUSEEVENTF_RIGHTDOWN: u32 = 0x0008;
pub const MOUSEEVENTF_RIGHTUP: u32 = 0x0010;
pub const MOUSEEVENTF_MIDDLEDOWN: u32 = 0x0020;
pub const MOUSEEVENTF_MIDDLEUP: u32 = 0x0040;
pub const MOUSEEVENTF_XDOWN: u32 = 0x0080;
pub const MOUSEEVENTF_XUP: u32 = 0x0100;
pub const MOUSEEVENTF_WHEEL: u32 = 0x0800;
pub const MOUSEEVENTF_HWHEEL: u32 = 0x1000;
pub const MOUSEEVENTF_VIRTUALDESK: u32 = 0x4000;
pub const MOUSEEVENTF_ABSOLUTE: u32 = 0x8000;

/// Pointer width of the process the records are built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Abi {
    X64,
    X86,
}

impl Abi {
    /// ABI of the current build target.
    pub const fn native() -> Self {
        if cfg!(target_pointer_width = "64") { Abi::X64 } else { Abi::X86 }
    }

    /// `sizeof(INPUT)`.
    pub const fn input_size(self) -> usize {
        match self {
            Abi::X64 => 40,
            Abi::X86 => 28,
        }
    }

    const fn union_offset(self) -> usize {
        match self {
            Abi::X64 => 8,
            Abi::X86 => 4,
        }
    }

    const fn pointer_kind(self) -> FieldKind {
        match self {
            Abi::X64 => FieldKind::UInt64,
            Abi::X86 => FieldKind::UInt32,
        }
    }

    /// `INPUT` with a `KEYBDINPUT` payload.
    pub fn keyboard_layout(self) -> Result<&'static StructLayout> {
        let layout = match self {
            Abi::X64 => &*KEYBOARD_INPUT_X64,
            Abi::X86 => &*KEYBOARD_INPUT_X86,
        };
        layout.as_ref().map_err(|e| e.clone())
    }

    /// `INPUT` with a `MOUSEINPUT` payload.
    pub fn mouse_layout(self) -> Result<&'static StructLayout> {
        let layout = match self {
            Abi::X64 => &*MOUSE_INPUT_X64,
            Abi::X86 => &*MOUSE_INPUT_X86,
        };
        layout.as_ref().map_err(|e| e.clone())
    }
}

static KEYBOARD_INPUT_X64: LazyLock<Result<StructLayout>> = LazyLock::new(|| keyboard_input(Abi::X64));
static KEYBOARD_INPUT_X86: LazyLock<Result<StructLayout>> = LazyLock::new(|| keyboard_input(Abi::X86));
static MOUSE_INPUT_X64: LazyLock<Result<StructLayout>> = LazyLock::new(|| mouse_input(Abi::X64));
static MOUSE_INPUT_X86: LazyLock<Result<StructLayout>> = LazyLock::new(|| mouse_input(Abi::X86));

fn keyboard_input(abi: Abi) -> Result<StructLayout> {
    let base = abi.union_offset();
    // KEYBDINPUT: WORD wVk; WORD wScan; DWORD dwFlags; DWORD time; ULONG_PTR dwExtraInfo
    let extra_info = match abi {
        Abi::X64 => base + 16,
        Abi::X86 => base + 12,
    };
    StructLayout::define(
        [
            FieldDescriptor::le("type", FieldKind::UInt32, 0),
            FieldDescriptor::le("wVk", FieldKind::UInt16, base),
            FieldDescriptor::le("wScan", FieldKind::UInt16, base + 2),
            FieldDescriptor::le("dwFlags", FieldKind::UInt32, base + 4),
            FieldDescriptor::le("time", FieldKind::UInt32, base + 8),
            FieldDescriptor::le("dwExtraInfo", abi.pointer_kind(), extra_info),
        ],
        abi.input_size(),
    )
}

fn mouse_input(abi: Abi) -> Result<StructLayout> {
    let base = abi.union_offset();
    // MOUSEINPUT: LONG dx; LONG dy; DWORD mouseData; DWORD dwFlags; DWORD time; ULONG_PTR dwExtraInfo
    let extra_info = match abi {
        Abi::X64 => base + 24,
        Abi::X86 => base + 20,
    };
    StructLayout::define(
        [
            FieldDescriptor::le("type", FieldKind::UInt32, 0),
            FieldDescriptor::le("dx", FieldKind::Int32, base),
            FieldDescriptor::le("dy", FieldKind::Int32, base + 4),
            FieldDescriptor::le("mouseData", FieldKind::UInt32, base + 8),
            FieldDescriptor::le("dwFlags", FieldKind::UInt32, base + 12),
            FieldDescriptor::le("time", FieldKind::UInt32, base + 16),
            FieldDescriptor::le("dwExtraInfo", abi.pointer_kind(), extra_info),
        ],
        abi.input_size(),
    )
}

/// One mouse event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MouseEvent {
    pub dx: i32,
    pub dy: i32,
    /// Wheel delta or X button; negative wheel deltas are stored as their two's complement
    pub mouse_data: i32,
    pub flags: u32,
}

fn batch_buffer(records: usize, abi: Abi) -> Result<ByteBuffer> {
    let size = records
        .checked_mul(abi.input_size())
        .ok_or_else(|| MarshalError::allocation(usize::MAX, usize::MAX, "INPUT batch size overflows"))?;
    ByteBuffer::new(size)
}

/// A key-down/key-up pair per virtual key, in order.
pub fn key_tap_batch(virtual_keys: &[u16], abi: Abi) -> Result<ByteBuffer> {
    let layout = abi.keyboard_layout()?;
    let mut buffer = batch_buffer(virtual_keys.len() * 2, abi)?;

    let records = virtual_keys.iter().flat_map(|&vk| {
        [0, KEYEVENTF_KEYUP].map(|flags| {
            [
                ("type", Value::from(INPUT_KEYBOARD)),
                ("wVk", Value::from(vk)),
                ("dwFlags", Value::from(flags)),
            ]
        })
    });
    let written = layout.encode_record_array(&mut buffer, 0, records)?;

    debug!(keys = virtual_keys.len(), records = written, ?abi, "Built key tap batch");
    Ok(buffer)
}

/// Type `text` as Unicode key events, one down/up pair per UTF-16 code unit.
///
/// Characters outside the BMP become two pairs (one per surrogate), as the OS expects.
pub fn unicode_text_batch(text: &str, abi: Abi) -> Result<ByteBuffer> {
    let layout = abi.keyboard_layout()?;
    let units: Vec<u16> = text.encode_utf16().collect();
    let mut buffer = batch_buffer(units.len() * 2, abi)?;

    let records = units.iter().flat_map(|&unit| {
        [KEYEVENTF_UNICODE, KEYEVENTF_UNICODE | KEYEVENTF_KEYUP].map(|flags| {
            [
                ("type", Value::from(INPUT_KEYBOARD)),
                ("wScan", Value::from(unit)),
                ("dwFlags", Value::from(flags)),
            ]
        })
    });
    let written = layout.encode_record_array(&mut buffer, 0, records)?;

    debug!(units = units.len(), records = written, ?abi, "Built unicode text batch");
    Ok(buffer)
}

/// One `INPUT_MOUSE` record per event.
pub fn mouse_batch(events: &[MouseEvent], abi: Abi) -> Result<ByteBuffer> {
    let layout = abi.mouse_layout()?;
    let mut buffer = batch_buffer(events.len(), abi)?;

    let records = events.iter().map(|event| {
        [
            ("type", Value::from(INPUT_MOUSE)),
            ("dx", Value::from(event.dx)),
            ("dy", Value::from(event.dy)),
            ("mouseData", Value::from(event.mouse_data as u32)),
            ("dwFlags", Value::from(event.flags)),
        ]
    });
    layout.encode_record_array(&mut buffer, 0, records)?;
    Ok(buffer)
}
