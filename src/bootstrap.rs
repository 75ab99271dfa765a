//! The stdlib written in Lambdatron itself (§6): threading and binding
//! macros plus the lazy-seq utilities built on `.lazy-seq`/`.cons`/`.seq`.
//! Loaded by [`crate::eval::Interpreter::run_bootstrap`] before user code
//! sees the `user` namespace.

pub const SOURCE: &str = r#"
(defmacro defn [name & fdecl]
  `(def ~name (fn ~name ~@fdecl)))

(defmacro when [test & body]
  `(if ~test (do ~@body)))

(defmacro when-let [bindings & body]
  `(let ~bindings (if ~(.first bindings) (do ~@body))))

(defmacro -> [x & forms]
  (loop [acc x
         rem forms]
    (if (.first rem)
      (recur
        (let [form (.first rem)]
          (.cons (.first form) (.cons acc (.rest form))))
        (.rest rem))
      acc)))

(defmacro lazy-seq [& body]
  `(.lazy-seq (fn [] ~@body)))

(defn concat [& colls]
  (apply .concat colls))

(defn iterate [f x]
  (lazy-seq (.cons x (iterate f (f x)))))

(defn repeat
  ([x] (lazy-seq (.cons x (repeat x))))
  ([n x]
   (if (zero? n)
     nil
     (lazy-seq (.cons x (repeat (dec n) x))))))

(defn repeatedly
  ([f] (lazy-seq (.cons (f) (repeatedly f))))
  ([n f]
   (if (zero? n)
     nil
     (lazy-seq (.cons (f) (repeatedly (dec n) f))))))

(defn take [n coll]
  (lazy-seq
    (if (zero? n)
      nil
      (when (.seq coll)
        (.cons (.first coll) (take (dec n) (.rest coll)))))))

(defn drop [n coll]
  (loop [n n coll coll]
    (if (zero? n)
      coll
      (if (.seq coll)
        (recur (dec n) (.rest coll))
        nil))))

(defn cycle
  ([coll] (cycle coll coll))
  ([coll remaining]
   (lazy-seq
     (if (.seq remaining)
       (.cons (.first remaining) (cycle coll (.rest remaining)))
       (cycle coll coll)))))

(defn interleave [c1 c2]
  (lazy-seq
    (when (.seq c1)
      (when (.seq c2)
        (.cons (.first c1) (.cons (.first c2) (interleave (.rest c1) (.rest c2))))))))

(defn interpose [sep coll]
  (lazy-seq
    (when (.seq coll)
      (if (.seq (.rest coll))
        (.cons (.first coll) (.cons sep (interpose sep (.rest coll))))
        (.cons (.first coll) nil)))))

(defn remove [pred coll]
  (lazy-seq
    (when (.seq coll)
      (if (pred (.first coll))
        (remove pred (.rest coll))
        (.cons (.first coll) (remove pred (.rest coll)))))))

(defn list* [& args]
  (if (.seq (.rest args))
    (.cons (.first args) (apply list* (.rest args)))
    (.seq (.first args))))
"#;
