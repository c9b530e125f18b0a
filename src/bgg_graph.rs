//! The Bruhat graph of a finite Coxeter group, which indexes the terms of the BGG complex.

use std::collections::VecDeque;

use algebra::CoxeterGroup;
use rustc_hash::FxHashMap;

use crate::BggError;

/// A square `(a, b, c, b')` of the Bruhat graph: `a → b → c` and `a → b' → c` with `b ≠ b'`.
pub type Square = (usize, usize, usize, usize);

/// The Bruhat graph of a Coxeter group.
///
/// Vertices are the group elements, numbered in order of enumeration: breadth first by length,
/// left multiplying the elements of each length by the generators in order. There is an arrow
/// `w → tw` whenever `t` is a reflection and `ℓ(tw) = ℓ(w) + 1`.
///
/// The arrows carry signs `±1` such that the product of the signs around every square is `-1`.
pub struct BggGraph<G: CoxeterGroup> {
    elements: Vec<G::Element>,
    words: Vec<Vec<usize>>,
    columns: Vec<Vec<usize>>,
    lengths: Vec<usize>,
    arrows: Vec<(usize, usize)>,
    arrow_index: FxHashMap<(usize, usize), usize>,
    incoming: Vec<Vec<usize>>,
    outgoing: Vec<Vec<usize>>,
    squares: Vec<Square>,
    signs: Vec<i64>,
}

impl<G: CoxeterGroup> BggGraph<G> {
    #[tracing::instrument(skip_all, fields(order = group.order()))]
    pub fn new(group: &G) -> Result<Self, BggError> {
        let (elements, words) = Self::enumerate(group)?;
        let vertex_count = elements.len();

        let lengths: Vec<usize> = words.iter().map(Vec::len).collect();
        let max_length = lengths.last().copied().unwrap_or(0);
        let mut columns = vec![Vec::new(); max_length + 1];
        for (v, &l) in lengths.iter().enumerate() {
            columns[l].push(v);
        }

        let index: FxHashMap<&G::Element, usize> =
            elements.iter().enumerate().map(|(i, x)| (x, i)).collect();
        let mut arrows = Vec::new();
        for (v, w) in elements.iter().enumerate() {
            for t in group.reflections() {
                let target = index[&group.multiply(t, w)];
                if lengths[target] == lengths[v] + 1 {
                    arrows.push((v, target));
                }
            }
        }
        drop(index);

        let arrow_index: FxHashMap<(usize, usize), usize> =
            arrows.iter().enumerate().map(|(i, &a)| (a, i)).collect();
        let mut incoming = vec![Vec::new(); vertex_count];
        let mut outgoing = vec![Vec::new(); vertex_count];
        for (i, &(source, target)) in arrows.iter().enumerate() {
            outgoing[source].push(i);
            incoming[target].push(i);
        }

        let mut graph = Self {
            elements,
            words,
            columns,
            lengths,
            arrows,
            arrow_index,
            incoming,
            outgoing,
            squares: Vec::new(),
            signs: Vec::new(),
        };
        graph.squares = graph.compute_squares();
        graph.signs = graph.compute_signs()?;
        graph.verify_signs()?;

        tracing::info!(
            vertices = graph.vertex_count(),
            arrows = graph.arrows.len(),
            squares = graph.squares.len(),
            "constructed Bruhat graph"
        );
        Ok(graph)
    }

    fn enumerate(group: &G) -> Result<(Vec<G::Element>, Vec<Vec<usize>>), BggError> {
        let order = group.order();
        let mut elements = vec![group.identity()];
        let mut words = vec![vec![]];
        let mut seen: FxHashMap<G::Element, usize> = FxHashMap::default();
        seen.insert(group.identity(), 0);

        let mut level = 0..1;
        while elements.len() < order {
            let start = elements.len();
            for parent in level.clone() {
                for (s, generator) in group.generators().iter().enumerate() {
                    let x = group.multiply(generator, &elements[parent]);
                    if seen.contains_key(&x) {
                        continue;
                    }
                    let mut word = Vec::with_capacity(words[parent].len() + 1);
                    word.push(s);
                    word.extend_from_slice(&words[parent]);
                    seen.insert(x.clone(), elements.len());
                    elements.push(x);
                    words.push(word);
                }
            }
            if elements.len() == start {
                return Err(BggError::EnumerationStalled {
                    found: elements.len(),
                    order,
                });
            }
            level = start..elements.len();
        }
        Ok((elements, words))
    }

    fn compute_squares(&self) -> Vec<Square> {
        let mut squares = Vec::new();
        for &(a, b) in &self.arrows {
            for &i in &self.outgoing[b] {
                let c = self.arrows[i].1;
                for &j in &self.incoming[c] {
                    let b2 = self.arrows[j].0;
                    if b2 != b && self.arrow_index.contains_key(&(a, b2)) {
                        squares.push((a, b, c, b2));
                    }
                }
            }
        }
        squares
    }

    /// Squares ending at each vertex.
    fn squares_into(&self) -> Vec<Vec<Square>> {
        let mut result = vec![Vec::new(); self.vertex_count()];
        for &square in &self.squares {
            result[square.2].push(square);
        }
        result
    }

    /// Fix signs vertex by vertex in order of length. At each vertex, the first unsigned incoming
    /// arrow gets `+1` and the squares ending there determine the arrows they connect it to.
    fn compute_signs(&self) -> Result<Vec<i64>, BggError> {
        let mut signs: Vec<Option<i64>> = vec![None; self.arrows.len()];
        for &i in &self.outgoing[0] {
            signs[i] = Some(1);
        }

        let squares_into = self.squares_into();
        for column in self.columns.iter().skip(2) {
            for &c in column {
                // Squares ending at c, indexed by their arrow (b, c).
                let mut by_arrow: FxHashMap<usize, Vec<Square>> = FxHashMap::default();
                for &square in &squares_into[c] {
                    by_arrow
                        .entry(self.arrow_index[&(square.1, c)])
                        .or_default()
                        .push(square);
                }

                for &start in &self.incoming[c] {
                    if signs[start].is_some() {
                        continue;
                    }
                    signs[start] = Some(1);
                    let mut queue = VecDeque::from([start]);
                    while let Some(arrow) = queue.pop_front() {
                        let Some(squares) = by_arrow.get(&arrow) else {
                            continue;
                        };
                        for &(a, b, c, b2) in squares {
                            let known = |x: usize, y: usize| signs[self.arrow_index[&(x, y)]];
                            let (Some(ab), Some(bc), Some(ab2)) =
                                (known(a, b), known(b, c), known(a, b2))
                            else {
                                continue;
                            };
                            let value = -ab * bc * ab2;
                            let other = self.arrow_index[&(b2, c)];
                            match signs[other] {
                                None => {
                                    signs[other] = Some(value);
                                    queue.push_back(other);
                                }
                                Some(existing) if existing != value => {
                                    return Err(BggError::SignConflict { tail: b2, head: c });
                                }
                                Some(_) => (),
                            }
                        }
                    }
                }
            }
        }
        Ok(signs.into_iter().map(|s| s.unwrap_or(1)).collect())
    }

    /// Check that the signs around every square multiply to `-1`.
    pub fn verify_signs(&self) -> Result<(), BggError> {
        for &square in &self.squares {
            let (a, b, c, b2) = square;
            let product: i64 = [(a, b), (b, c), (a, b2), (b2, c)]
                .iter()
                .map(|arrow| self.signs[self.arrow_index[arrow]])
                .product();
            if product != -1 {
                return Err(BggError::SquareSign(square));
            }
        }
        Ok(())
    }

    pub fn vertex_count(&self) -> usize {
        self.elements.len()
    }

    pub fn element(&self, v: usize) -> &G::Element {
        &self.elements[v]
    }

    pub fn elements(&self) -> &[G::Element] {
        &self.elements
    }

    /// The reduced word of a vertex, as 0-based generator indices. The element is the product
    /// of the generators in the order listed.
    pub fn word(&self, v: usize) -> &[usize] {
        &self.words[v]
    }

    /// The reduced word with 1-based generator indices, or `e` for the identity.
    pub fn word_string(&self, v: usize) -> String {
        if self.words[v].is_empty() {
            return "e".to_owned();
        }
        self.words[v].iter().map(|s| (s + 1).to_string()).collect()
    }

    pub fn length(&self, v: usize) -> usize {
        self.lengths[v]
    }

    pub fn max_length(&self) -> usize {
        self.columns.len() - 1
    }

    /// The longest element, which is enumerated last.
    pub fn longest_element(&self) -> usize {
        self.vertex_count() - 1
    }

    /// The vertices of each length.
    pub fn columns(&self) -> &[Vec<usize>] {
        &self.columns
    }

    pub fn column(&self, length: usize) -> &[usize] {
        self.columns.get(length).map_or(&[], Vec::as_slice)
    }

    pub fn arrows(&self) -> &[(usize, usize)] {
        &self.arrows
    }

    pub fn arrow(&self, source: usize, target: usize) -> Option<usize> {
        self.arrow_index.get(&(source, target)).copied()
    }

    /// Indices of the arrows leaving a vertex.
    pub fn outgoing(&self, v: usize) -> &[usize] {
        &self.outgoing[v]
    }

    /// Indices of the arrows entering a vertex, in order of discovery.
    pub fn incoming(&self, v: usize) -> &[usize] {
        &self.incoming[v]
    }

    pub fn squares(&self) -> &[Square] {
        &self.squares
    }

    pub fn sign(&self, arrow: usize) -> i64 {
        self.signs[arrow]
    }

    pub fn signs(&self) -> &[i64] {
        &self.signs
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use algebra::{CartanType, RootSystem, WeylGroup};
    use expect_test::expect;

    use super::*;

    fn graph(t: CartanType) -> BggGraph<WeylGroup> {
        BggGraph::new(&WeylGroup::new(Arc::new(RootSystem::new(t)))).unwrap()
    }

    #[test]
    fn test_a2() {
        let g = graph(CartanType::A(2));
        let words: Vec<_> = (0..g.vertex_count()).map(|v| g.word_string(v)).collect();
        expect![[r#"["e", "1", "2", "21", "12", "121"]"#]].assert_eq(&format!("{words:?}"));

        let arrows: Vec<_> = g
            .arrows()
            .iter()
            .map(|&(a, b)| format!("{}->{}", g.word_string(a), g.word_string(b)))
            .collect();
        expect![[r#"["e->1", "e->2", "1->21", "1->12", "2->12", "2->21", "21->121", "12->121"]"#]]
            .assert_eq(&format!("{arrows:?}"));

        assert_eq!(g.squares().len(), 8);
        assert_eq!(g.max_length(), 3);
        assert_eq!(g.longest_element(), 5);
        assert_eq!(g.column(1), &[1, 2]);
    }

    #[test]
    fn test_a2_signs() {
        let g = graph(CartanType::A(2));
        let negative: Vec<_> = g
            .arrows()
            .iter()
            .enumerate()
            .filter(|&(i, _)| g.sign(i) == -1)
            .map(|(_, &(a, b))| format!("{}->{}", g.word_string(a), g.word_string(b)))
            .collect();
        expect![[r#"["2->12", "2->21", "12->121"]"#]].assert_eq(&format!("{negative:?}"));
    }

    #[test]
    fn test_a1() {
        let g = graph(CartanType::A(1));
        assert_eq!(g.arrows(), &[(0, 1)]);
        assert_eq!(g.signs(), &[1]);
        assert!(g.squares().is_empty());
    }

    #[test]
    fn test_sign_conflict_message() {
        let err = BggError::SignConflict { tail: 3, head: 5 };
        expect!["conflicting signs for the arrow 3 -> 5"].assert_eq(&err.to_string());
        assert!(std::error::Error::source(&err).is_none());
    }
}
