//! Raw device memory allocation.
//!
//! Buffers are backed by plain `vkAllocateMemory`; the memory type is
//! picked by [`select_memory_type`](crate::select::select_memory_type).

use crate::error::{GpuError, Result};
use crate::select::select_memory_type;
use ash::vk;

/// A buffer with its backing device memory.
pub struct Buffer {
    pub buffer: vk::Buffer,
    pub memory: vk::DeviceMemory,
    pub size: vk::DeviceSize,
    coherent: bool,
}

impl Buffer {
    /// Create a buffer backed by memory with the given properties.
    ///
    /// Fails with [`GpuError::NoSuitableMemoryType`] when no memory type
    /// satisfies both the buffer's requirements and `flags`.
    ///
    /// # Safety
    /// The device must be valid, and `memory_properties` must belong to the
    /// physical device the logical device was created from.
    pub unsafe fn new(
        device: &ash::Device,
        memory_properties: &vk::PhysicalDeviceMemoryProperties,
        size: vk::DeviceSize,
        usage: vk::BufferUsageFlags,
        flags: vk::MemoryPropertyFlags,
    ) -> Result<Self> {
        let buffer_info = vk::BufferCreateInfo::default()
            .size(size)
            .usage(usage)
            .sharing_mode(vk::SharingMode::EXCLUSIVE);

        let buffer = device.create_buffer(&buffer_info, None)?;
        let requirements = device.get_buffer_memory_requirements(buffer);

        let Some(type_index) = select_memory_type(memory_properties, &requirements, flags) else {
            device.destroy_buffer(buffer, None);
            return Err(GpuError::NoSuitableMemoryType);
        };

        let alloc_info = vk::MemoryAllocateInfo::default()
            .allocation_size(requirements.size)
            .memory_type_index(type_index);

        let memory = match device.allocate_memory(&alloc_info, None) {
            Ok(memory) => memory,
            Err(e) => {
                device.destroy_buffer(buffer, None);
                return Err(GpuError::from(e));
            }
        };

        if let Err(e) = device.bind_buffer_memory(buffer, memory, 0) {
            device.free_memory(memory, None);
            device.destroy_buffer(buffer, None);
            return Err(GpuError::from(e));
        }

        let coherent = memory_properties.memory_types[type_index as usize]
            .property_flags
            .contains(vk::MemoryPropertyFlags::HOST_COHERENT);

        Ok(Self {
            buffer,
            memory,
            size,
            coherent,
        })
    }

    /// Create a host-visible staging buffer.
    ///
    /// # Safety
    /// See [`Buffer::new`].
    pub unsafe fn host_visible(
        device: &ash::Device,
        memory_properties: &vk::PhysicalDeviceMemoryProperties,
        size: vk::DeviceSize,
        usage: vk::BufferUsageFlags,
    ) -> Result<Self> {
        Self::new(
            device,
            memory_properties,
            size,
            usage,
            vk::MemoryPropertyFlags::HOST_VISIBLE,
        )
    }

    /// Create a device-local buffer.
    ///
    /// # Safety
    /// See [`Buffer::new`].
    pub unsafe fn device_local(
        device: &ash::Device,
        memory_properties: &vk::PhysicalDeviceMemoryProperties,
        size: vk::DeviceSize,
        usage: vk::BufferUsageFlags,
    ) -> Result<Self> {
        Self::new(
            device,
            memory_properties,
            size,
            usage,
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
        )
    }

    /// Write bytes into the buffer. The buffer must be host-visible.
    ///
    /// Flushes the mapped range when the backing memory is not coherent.
    ///
    /// # Safety
    /// The device must be valid and the buffer must not be in use by the
    /// GPU.
    pub unsafe fn write(&self, device: &ash::Device, data: &[u8]) -> Result<()> {
        if data.len() as vk::DeviceSize > self.size {
            return Err(GpuError::Other(format!(
                "Write of {} bytes exceeds buffer size {}",
                data.len(),
                self.size
            )));
        }

        let ptr = device.map_memory(
            self.memory,
            0,
            data.len() as vk::DeviceSize,
            vk::MemoryMapFlags::empty(),
        )?;

        std::ptr::copy_nonoverlapping(data.as_ptr(), ptr.cast::<u8>(), data.len());

        if !self.coherent {
            let range = vk::MappedMemoryRange::default()
                .memory(self.memory)
                .offset(0)
                .size(vk::WHOLE_SIZE);
            device.flush_mapped_memory_ranges(std::slice::from_ref(&range))?;
        }

        device.unmap_memory(self.memory);

        Ok(())
    }

    /// Destroy the buffer and free its memory.
    ///
    /// # Safety
    /// The buffer must not be in use.
    pub unsafe fn destroy(&self, device: &ash::Device) {
        device.destroy_buffer(self.buffer, None);
        device.free_memory(self.memory, None);
    }
}
