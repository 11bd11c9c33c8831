// Find bytes of a character class in a buffer, forwards and backwards.

use litscan::{CharClass, rshufti_exec, rtruffle_exec, shufti_exec, truffle_exec};

fn main() {
    let haystack = b"sphinx of black quartz, judge my vow \xc3\xa9!";

    // Small ASCII classes usually fit Shufti's eight buckets.
    let vowels = CharClass::from_bytes(b"aeiou");
    let mask = vowels.build_shufti_masks().expect("vowels fit");
    println!("first vowel:  {:?}", shufti_exec(&mask, haystack));
    println!("last vowel:   {:?}", rshufti_exec(&mask, haystack));

    // Truffle takes any class, here the non-ASCII range.
    let mut high = CharClass::new();
    high.set_range(0x80, 0xff);
    let mask = high.build_truffle_masks();
    println!("first >=0x80: {:?}", truffle_exec(&mask, haystack));
    println!("last >=0x80:  {:?}", rtruffle_exec(&mask, haystack));
}
