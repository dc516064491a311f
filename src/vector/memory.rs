//! Loads and stores against element slices, boolean slices and memory
//! segments.
//!
//! Offsets are signed. Unmasked accesses require every lane in range; masked
//! accesses only check the selected lanes, so a masked tail access may start
//! or end outside the buffer. Unselected lanes read as zero and are never
//! written. Gathers and scatters take an index map whose `length` entries
//! starting at `map_offset` must all exist; lane `i` then addresses
//! `offset + map[map_offset + i]`.

use log::trace;

use crate::error::{check_from_index_size, out_of_bounds, Result};
use crate::lane::{IntegralLane, LaneElement};
use crate::mask::Mask;
use crate::memory::{ByteOrder, MemorySegment};
use crate::species::Species;
use crate::vector::Vector;

/// Position of one lane in a buffer, `None` for an unselected lane.
type Positions = Vec<Option<usize>>;

/// Start of the `size` bytes or elements of `lane`, checked against `limit`.
fn lane_position(offset: isize, lane: usize, size: usize, limit: usize) -> Result<usize> {
    let start = isize::try_from(lane * size)
        .ok()
        .and_then(|step| offset.checked_add(step))
        .ok_or_else(|| {
            out_of_bounds(offset as i64, limit, format!("lane {lane} address overflows"))
        })?;
    check_from_index_size(start, size, limit)
}

/// Positions of `length` lanes of `size` units laid out from `offset`.
fn contiguous_positions(
    offset: isize,
    length: usize,
    size: usize,
    limit: usize,
    selected: Option<&[bool]>,
) -> Result<Positions> {
    let whole = check_from_index_size(offset, length * size, limit);
    match selected {
        None => {
            let start = whole?;
            Ok((0..length).map(|i| Some(start + i * size)).collect())
        }
        Some(bits) => match whole {
            Ok(start) => Ok(bits
                .iter()
                .enumerate()
                .map(|(i, &set)| set.then_some(start + i * size))
                .collect()),
            Err(_) => {
                trace!("masked access at {offset} is partly out of range; checking selected lanes");
                bits.iter()
                    .enumerate()
                    .map(|(i, &set)| {
                        if set {
                            lane_position(offset, i, size, limit).map(Some)
                        } else {
                            Ok(None)
                        }
                    })
                    .collect()
            }
        },
    }
}

/// Positions `offset + map[map_offset + i]` of the selected lanes.
fn mapped_positions(
    offset: isize,
    index_map: &[i32],
    map_offset: usize,
    length: usize,
    limit: usize,
    selected: Option<&[bool]>,
) -> Result<Positions> {
    let start = check_from_index_size(map_offset as isize, length, index_map.len())?;
    let window = &index_map[start..start + length];
    window
        .iter()
        .enumerate()
        .map(|(i, &index)| {
            if selected.map_or(true, |bits| bits[i]) {
                let position = offset.checked_add(index as isize).ok_or_else(|| {
                    out_of_bounds(offset as i64, limit, format!("lane {i} address overflows"))
                })?;
                check_from_index_size(position, 1, limit).map(Some)
            } else {
                Ok(None)
            }
        })
        .collect()
}

fn selection<E: LaneElement>(species: Species<E>, mask: &Mask<E>) -> Result<Option<&[bool]>> {
    mask.check(species)?;
    Ok(if mask.all_true() { None } else { Some(mask.bits()) })
}

fn gather<E: LaneElement, T: Copy>(
    species: Species<E>,
    source: &[T],
    positions: &[Option<usize>],
    convert: impl Fn(T) -> E,
) -> Vector<E> {
    species.from_fn(|i| positions[i].map_or(E::ZERO, |p| convert(source[p])))
}

fn scatter<E: LaneElement, T>(
    lanes: &[E],
    target: &mut [T],
    positions: &[Option<usize>],
    convert: impl Fn(E) -> T,
) {
    for (&e, position) in lanes.iter().zip(positions) {
        if let Some(p) = *position {
            target[p] = convert(e);
        }
    }
}

impl<E: LaneElement> Vector<E> {
    /// Loads `species.length()` lanes from `a` starting at `offset`.
    pub fn from_array(species: Species<E>, a: &[E], offset: isize) -> Result<Vector<E>> {
        let positions = contiguous_positions(offset, species.length(), 1, a.len(), None)?;
        Ok(gather(species, a, &positions, |e| e))
    }

    pub fn from_array_masked(
        species: Species<E>,
        a: &[E],
        offset: isize,
        mask: &Mask<E>,
    ) -> Result<Vector<E>> {
        let selected = selection(species, mask)?;
        let positions = contiguous_positions(offset, species.length(), 1, a.len(), selected)?;
        Ok(gather(species, a, &positions, |e| e))
    }

    /// Gathers lane `i` from `a[offset + index_map[map_offset + i]]`.
    pub fn from_array_mapped(
        species: Species<E>,
        a: &[E],
        offset: isize,
        index_map: &[i32],
        map_offset: usize,
    ) -> Result<Vector<E>> {
        let positions =
            mapped_positions(offset, index_map, map_offset, species.length(), a.len(), None)?;
        Ok(gather(species, a, &positions, |e| e))
    }

    pub fn from_array_mapped_masked(
        species: Species<E>,
        a: &[E],
        offset: isize,
        index_map: &[i32],
        map_offset: usize,
        mask: &Mask<E>,
    ) -> Result<Vector<E>> {
        let selected = selection(species, mask)?;
        let positions =
            mapped_positions(offset, index_map, map_offset, species.length(), a.len(), selected)?;
        Ok(gather(species, a, &positions, |e| e))
    }

    pub fn into_array(&self, a: &mut [E], offset: isize) -> Result<()> {
        let positions = contiguous_positions(offset, self.length(), 1, a.len(), None)?;
        scatter(self.lanes(), a, &positions, |e| e);
        Ok(())
    }

    pub fn into_array_masked(&self, a: &mut [E], offset: isize, mask: &Mask<E>) -> Result<()> {
        let selected = selection(self.species(), mask)?;
        let positions = contiguous_positions(offset, self.length(), 1, a.len(), selected)?;
        scatter(self.lanes(), a, &positions, |e| e);
        Ok(())
    }

    /// Scatters lane `i` to `a[offset + index_map[map_offset + i]]`.
    ///
    /// Every address is checked before anything is written. When two lanes
    /// map to the same element, the higher lane wins.
    pub fn into_array_mapped(
        &self,
        a: &mut [E],
        offset: isize,
        index_map: &[i32],
        map_offset: usize,
    ) -> Result<()> {
        let positions =
            mapped_positions(offset, index_map, map_offset, self.length(), a.len(), None)?;
        scatter(self.lanes(), a, &positions, |e| e);
        Ok(())
    }

    pub fn into_array_mapped_masked(
        &self,
        a: &mut [E],
        offset: isize,
        index_map: &[i32],
        map_offset: usize,
        mask: &Mask<E>,
    ) -> Result<()> {
        let selected = selection(self.species(), mask)?;
        let positions =
            mapped_positions(offset, index_map, map_offset, self.length(), a.len(), selected)?;
        scatter(self.lanes(), a, &positions, |e| e);
        Ok(())
    }

    /// Loads lanes stored in `order` from the bytes at `offset`.
    pub fn from_memory_segment(
        species: Species<E>,
        segment: &MemorySegment,
        offset: isize,
        order: ByteOrder,
    ) -> Result<Vector<E>> {
        segment.check_alive()?;
        Self::load_segment(species, segment, offset, order, None)
    }

    pub fn from_memory_segment_masked(
        species: Species<E>,
        segment: &MemorySegment,
        offset: isize,
        order: ByteOrder,
        mask: &Mask<E>,
    ) -> Result<Vector<E>> {
        segment.check_alive()?;
        let selected = selection(species, mask)?;
        Self::load_segment(species, segment, offset, order, selected)
    }

    fn load_segment(
        species: Species<E>,
        segment: &MemorySegment,
        offset: isize,
        order: ByteOrder,
        selected: Option<&[bool]>,
    ) -> Result<Vector<E>> {
        let size = E::LANE_TYPE.byte_size();
        let positions =
            contiguous_positions(offset, species.length(), size, segment.byte_size(), selected)?;
        segment.read(|bytes| {
            species.from_fn(|i| {
                positions[i].map_or(E::ZERO, |p| {
                    let e = E::read_ne_bytes(&bytes[p..p + size]);
                    if order.is_native() { e } else { e.swap_lane_bytes() }
                })
            })
        })
    }

    /// Stores the lanes in `order` to the bytes at `offset`.
    pub fn into_memory_segment(
        &self,
        segment: &MemorySegment,
        offset: isize,
        order: ByteOrder,
    ) -> Result<()> {
        segment.check_writable()?;
        self.store_segment(segment, offset, order, None)
    }

    pub fn into_memory_segment_masked(
        &self,
        segment: &MemorySegment,
        offset: isize,
        order: ByteOrder,
        mask: &Mask<E>,
    ) -> Result<()> {
        segment.check_writable()?;
        let selected = selection(self.species(), mask)?;
        self.store_segment(segment, offset, order, selected)
    }

    fn store_segment(
        &self,
        segment: &MemorySegment,
        offset: isize,
        order: ByteOrder,
        selected: Option<&[bool]>,
    ) -> Result<()> {
        let size = E::LANE_TYPE.byte_size();
        let positions =
            contiguous_positions(offset, self.length(), size, segment.byte_size(), selected)?;
        segment.write(|bytes| {
            for (&e, position) in self.lanes().iter().zip(&positions) {
                if let Some(p) = *position {
                    let e = if order.is_native() { e } else { e.swap_lane_bytes() };
                    e.write_ne_bytes(&mut bytes[p..p + size]);
                }
            }
        })
    }
}

/// Boolean slices: `true` loads as one, and a lane stores its low bit.
impl<I: IntegralLane> Vector<I> {
    pub fn from_bool_array(species: Species<I>, a: &[bool], offset: isize) -> Result<Vector<I>> {
        let positions = contiguous_positions(offset, species.length(), 1, a.len(), None)?;
        Ok(gather(species, a, &positions, I::from_bool))
    }

    pub fn from_bool_array_masked(
        species: Species<I>,
        a: &[bool],
        offset: isize,
        mask: &Mask<I>,
    ) -> Result<Vector<I>> {
        let selected = selection(species, mask)?;
        let positions = contiguous_positions(offset, species.length(), 1, a.len(), selected)?;
        Ok(gather(species, a, &positions, I::from_bool))
    }

    pub fn from_bool_array_mapped(
        species: Species<I>,
        a: &[bool],
        offset: isize,
        index_map: &[i32],
        map_offset: usize,
    ) -> Result<Vector<I>> {
        let positions =
            mapped_positions(offset, index_map, map_offset, species.length(), a.len(), None)?;
        Ok(gather(species, a, &positions, I::from_bool))
    }

    pub fn from_bool_array_mapped_masked(
        species: Species<I>,
        a: &[bool],
        offset: isize,
        index_map: &[i32],
        map_offset: usize,
        mask: &Mask<I>,
    ) -> Result<Vector<I>> {
        let selected = selection(species, mask)?;
        let positions =
            mapped_positions(offset, index_map, map_offset, species.length(), a.len(), selected)?;
        Ok(gather(species, a, &positions, I::from_bool))
    }

    pub fn into_bool_array(&self, a: &mut [bool], offset: isize) -> Result<()> {
        let positions = contiguous_positions(offset, self.length(), 1, a.len(), None)?;
        scatter(self.lanes(), a, &positions, I::low_bit);
        Ok(())
    }

    pub fn into_bool_array_masked(
        &self,
        a: &mut [bool],
        offset: isize,
        mask: &Mask<I>,
    ) -> Result<()> {
        let selected = selection(self.species(), mask)?;
        let positions = contiguous_positions(offset, self.length(), 1, a.len(), selected)?;
        scatter(self.lanes(), a, &positions, I::low_bit);
        Ok(())
    }

    pub fn into_bool_array_mapped(
        &self,
        a: &mut [bool],
        offset: isize,
        index_map: &[i32],
        map_offset: usize,
    ) -> Result<()> {
        let positions =
            mapped_positions(offset, index_map, map_offset, self.length(), a.len(), None)?;
        scatter(self.lanes(), a, &positions, I::low_bit);
        Ok(())
    }

    pub fn into_bool_array_mapped_masked(
        &self,
        a: &mut [bool],
        offset: isize,
        index_map: &[i32],
        map_offset: usize,
        mask: &Mask<I>,
    ) -> Result<()> {
        let selected = selection(self.species(), mask)?;
        let positions =
            mapped_positions(offset, index_map, map_offset, self.length(), a.len(), selected)?;
        scatter(self.lanes(), a, &positions, I::low_bit);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LaneError;
    use crate::memory::Arena;
    use crate::shape::Shape;

    fn bytes() -> Species<i8> {
        Species::of(Shape::S64)
    }

    #[test]
    fn contiguous_bounds() {
        let data: Vec<i8> = (0..20).collect();
        assert!(Vector::from_array(bytes(), &data, 12).is_ok());
        assert!(matches!(
            Vector::from_array(bytes(), &data, 13),
            Err(LaneError::OutOfBounds { .. })
        ));
        assert!(Vector::from_array(bytes(), &data, -1).is_err());
    }

    #[test]
    fn masked_tail_load_zero_fills() {
        let data: Vec<i8> = (1..=10).collect();
        let mask = bytes().index_in_range(6, 10);
        let v = Vector::from_array_masked(bytes(), &data, 6, &mask).expect("selected lanes fit");
        assert_eq!(v.to_array(), vec![7, 8, 9, 10, 0, 0, 0, 0]);
        let all = bytes().mask_all(true);
        assert!(Vector::from_array_masked(bytes(), &data, 6, &all).is_err());
    }

    #[test]
    fn masked_store_leaves_unselected_elements() {
        let mut out = [0i8; 10];
        let v = bytes().broadcast(5);
        let mask = Mask::from_bits(bytes(), 0b0000_0011);
        v.into_array_masked(&mut out, 8, &mask).expect("two lanes fit");
        assert_eq!(out[8..], [5, 5]);
        assert_eq!(out[..8], [0; 8]);
    }

    #[test]
    fn gather_and_scatter() {
        let data: Vec<i8> = (0..16).map(|i| i * 2).collect();
        let map = [0, 7, 1, 6, 2, 5, 3, 4, 99];
        let v = Vector::from_array_mapped(bytes(), &data, 1, &map, 0).expect("in range");
        assert_eq!(v.to_array(), vec![2, 16, 4, 14, 6, 12, 8, 10]);
        assert!(Vector::from_array_mapped(bytes(), &data, 1, &map, 2).is_err());

        let mut out = [0i8; 8];
        let bad_map = [0, 1, 2, 3, 4, 5, 6, 8];
        assert!(v.into_array_mapped(&mut out, 0, &bad_map, 0).is_err());
        assert_eq!(out, [0; 8]);
        let mask = Mask::from_bits(bytes(), 0b0111_1111);
        v.into_array_mapped_masked(&mut out, 0, &bad_map, 0, &mask)
            .expect("lane 7 is unselected");
        assert_eq!(out[..7], [2, 16, 4, 14, 6, 12, 8]);
    }

    #[test]
    fn bool_arrays_use_the_low_bit() {
        let species = Species::<u16>::of(Shape::S64);
        let v = Vector::from_bool_array(species, &[true, false, true, true], 0).expect("fits");
        assert_eq!(v.to_array(), vec![1, 0, 1, 1]);
        let mut out = [true; 4];
        Vector::from_values(species, &[2, 3, 4, 5])
            .and_then(|w| w.into_bool_array(&mut out, 0))
            .expect("fits");
        assert_eq!(out, [false, true, false, true]);
    }

    #[test]
    fn segments_honor_byte_order() {
        let segment = MemorySegment::of_vec(vec![0, 0, 0, 1, 0, 0, 0, 2]);
        let species = Species::<i32>::of(Shape::S64);
        let v = Vector::from_memory_segment(species, &segment, 0, ByteOrder::BigEndian)
            .expect("eight bytes");
        assert_eq!(v.to_array(), vec![1, 2]);
        v.into_memory_segment(&segment, 0, ByteOrder::LittleEndian)
            .expect("writable");
        assert_eq!(segment.to_vec(), Ok(vec![1, 0, 0, 0, 2, 0, 0, 0]));
        assert!(Vector::from_memory_segment(species, &segment, 1, ByteOrder::native()).is_err());
    }

    #[test]
    fn segment_lanes_must_fit_whole() {
        let segment = MemorySegment::of_vec(vec![7; 6]);
        let species = Species::<i32>::of(Shape::S64);
        let first = Mask::from_bits(species, 0b01);
        let v = Vector::from_memory_segment_masked(species, &segment, 0, ByteOrder::LittleEndian, &first)
            .expect("first lane fits");
        assert_eq!(v.to_array(), vec![0x0707_0707, 0]);
        let second = Mask::from_bits(species, 0b10);
        assert!(Vector::from_memory_segment_masked(
            species,
            &segment,
            0,
            ByteOrder::LittleEndian,
            &second
        )
        .is_err());
    }

    #[test]
    fn closed_and_read_only_segments() {
        let arena = Arena::new();
        let segment = arena.allocate(16);
        let species = Species::<i32>::of(Shape::S128);
        let v = species.broadcast(3);
        assert!(v
            .into_memory_segment(&segment.as_read_only(), 0, ByteOrder::native())
            .is_err());
        v.into_memory_segment(&segment, 0, ByteOrder::native()).expect("open arena");
        arena.close();
        assert!(matches!(
            Vector::from_memory_segment(species, &segment, 0, ByteOrder::native()),
            Err(LaneError::ResourceReleased { .. })
        ));
        assert!(matches!(
            v.into_memory_segment(&segment, 0, ByteOrder::native()),
            Err(LaneError::ResourceReleased { .. })
        ));
    }
}
