use crate::DemoError;
use kernel_frames::{PhysicalMemory, PoolId, PoolRegistry};
use kernel_memory_addresses::FRAME_SIZE;
use log::trace;

/// Allocates `depth % 4 + 1` frames, fills them, recurses, then checks the
/// fill survived before releasing the run by frame number.
pub fn run(
    registry: &mut PoolRegistry<'_>,
    memory: &PhysicalMemory<'_>,
    pool: PoolId,
    depth: u32,
) -> Result<(), DemoError> {
    if depth == 0 {
        return Ok(());
    }

    let n = u64::from(depth % 4 + 1);
    let head = registry.get_frames(pool, n)?;
    let bytes = memory
        .frames(head, n)
        .ok_or(DemoError::Unmapped { frame: head })?;

    let expected = pattern(depth);
    for byte in bytes {
        byte.set(expected);
    }
    trace!("depth {depth}: filled {n} frame(s) at {head} with {expected:#04x}");

    run(registry, memory, pool, depth - 1)?;

    if let Some((offset, found)) = bytes
        .iter()
        .map(core::cell::Cell::get)
        .enumerate()
        .find(|&(_, byte)| byte != expected)
    {
        return Err(DemoError::Corrupted {
            frame: head + offset as u64 / FRAME_SIZE,
            expected,
            found,
        });
    }

    registry.release_frames(head)?;
    Ok(())
}

/// Fill byte for a given depth; neighbouring depths never share a pattern.
#[allow(clippy::cast_possible_truncation)]
const fn pattern(depth: u32) -> u8 {
    (depth as u8) ^ 0xA5
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel_frames::InfoFrame;
    use kernel_memory_addresses::PhysicalFrame;

    #[test]
    fn exercise_returns_every_frame() {
        let mut ram = vec![0u8; 64 * FRAME_SIZE as usize];
        let memory = PhysicalMemory::new(PhysicalFrame::new(0), &mut ram);
        let mut registry = PoolRegistry::new();
        let id = registry
            .create_pool(&memory, PhysicalFrame::new(0), 64, InfoFrame::SelfHosted)
            .unwrap();

        run(&mut registry, &memory, id, 12).unwrap();
        assert_eq!(registry.pool(id).unwrap().free_count(), 63);
    }

    #[test]
    fn exhaustion_is_reported() {
        let mut ram = vec![0u8; 8 * FRAME_SIZE as usize];
        let memory = PhysicalMemory::new(PhysicalFrame::new(0), &mut ram);
        let mut registry = PoolRegistry::new();
        let id = registry
            .create_pool(&memory, PhysicalFrame::new(0), 8, InfoFrame::SelfHosted)
            .unwrap();

        assert!(matches!(
            run(&mut registry, &memory, id, 8),
            Err(DemoError::Pool(_))
        ));
    }

    #[test]
    fn patterns_differ_between_neighbours() {
        assert_ne!(pattern(1), pattern(2));
        assert_ne!(pattern(255), pattern(256 + 254));
    }
}
