use rbheap::datastruct::OrderedMap;

fn main() {
    let mut tree = OrderedMap::new();
    for (rank, key) in [2, 11, 6, 10, 26, 7, 18, 8, 13, 22, 12, 15, 17]
        .iter()
        .enumerate()
    {
        tree.put(*key, rank);
    }
    tree.remove(&10);
    print!("{}", tree.dump_as_dot());
}
