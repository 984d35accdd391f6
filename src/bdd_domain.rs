use crate::context::Cmp;

/// A finite integer range `[base, base + size)` encoded in a block of
/// `binsize` BDD variables starting at `offset`. Value `v` is stored as
/// the binary code `v - base`.
#[derive(Debug, PartialEq, Clone)]
pub struct BDDDomain {
    pub size: i64,
    pub binsize: i32,
    pub offset: i32, // where does the block start in the number of variables
    pub base: i64,
    pub dom: buddy_rs::BDD,
}

impl BDDDomain {
    pub fn binsize_for(size: i64) -> i32 {
        let mut binsize = 1;
        let mut calcsize: i64 = 2;

        while calcsize < size {
            binsize += 1;
            calcsize *= 2;
        }
        binsize
    }

    pub fn new(b: &buddy_rs::BDDManager, base: i64, size: i64, offset: i32) -> Self {
        let binsize = Self::binsize_for(size);
        let mut d = BDDDomain {
            size,
            binsize,
            offset,
            base,
            dom: b.one(),
        };
        // valid codes are 0..=size-1
        d.dom = d.below(b, size - 1, true);
        d
    }

    // code < c, or code <= c when inclusive. built from the least
    // significant bit upwards.
    fn below(&self, b: &buddy_rs::BDDManager, c: i64, inclusive: bool) -> buddy_rs::BDD {
        let mut val = c;
        let mut r = if inclusive { b.one() } else { b.zero() };

        for n in 0..self.binsize {
            let t = b.ithvar(n + self.offset);
            let nt = b.not(&t);
            let tmp = if val & 0x1 == 0x1 {
                b.or(&nt, &r)
            } else {
                b.and(&nt, &r)
            };

            val >>= 1;
            r = tmp;
        }
        r
    }

    // check if domain accepts code "d"
    pub fn digit(&self, b: &buddy_rs::BDDManager, d: i64) -> buddy_rs::BDD {
        let mut val = d;
        let mut v = b.one();
        for n in 0..self.binsize {
            let term = if val & 0x1 == 0x1 {
                b.ithvar(n + self.offset)
            } else {
                b.nithvar(n + self.offset)
            };
            v = b.and(&term, &v);
            val >>= 1;
        }
        v
    }

    /// The set of codes whose value satisfies `value <cmp> k`. Does not
    /// include the domain restriction itself.
    pub fn compare(&self, b: &buddy_rs::BDDManager, cmp: Cmp, k: i64) -> buddy_rs::BDD {
        let code = k - self.base;
        if code < 0 {
            return match cmp {
                Cmp::Gt => b.one(),
                _ => b.zero(),
            };
        }
        if code >= self.size {
            return match cmp {
                Cmp::Lt => b.one(),
                _ => b.zero(),
            };
        }

        match cmp {
            Cmp::Lt => self.below(b, code, false),
            Cmp::Gt => {
                let le = self.below(b, code, true);
                b.not(&le)
            }
            Cmp::Eq => self.digit(b, code),
        }
    }

    pub fn domain_bdd(&self) -> buddy_rs::BDD {
        self.dom.clone()
    }
}

#[test]
fn binsize_covers_size() {
    assert_eq!(BDDDomain::binsize_for(1), 1);
    assert_eq!(BDDDomain::binsize_for(2), 1);
    assert_eq!(BDDDomain::binsize_for(3), 2);
    assert_eq!(BDDDomain::binsize_for(4), 2);
    assert_eq!(BDDDomain::binsize_for(5), 3);
    assert_eq!(BDDDomain::binsize_for(1 << 20), 20);
}
